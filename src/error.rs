//! Domain-specific error types for the Life Kernel service

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Main error type for the Life Kernel HTTP service.
///
/// Each variant carries what the server logs; the caller-visible body is the
/// fixed string from [`KernelError::public_message`].
#[derive(Error, Debug)]
pub enum KernelError {
    #[error("Missing 'query' in request body")]
    InvalidInput,

    #[error("Life Kernel is not configured. Missing GEMINI_API_KEY.")]
    NotConfigured,

    #[error("Gemini API error {status}: {body}")]
    UpstreamFailure { status: u16, body: String },

    #[error("Empty response from Life Kernel model")]
    EmptyUpstreamResponse,

    #[error("Failed to parse Gemini JSON: {message} (offending text: {text})")]
    MalformedJson { message: String, text: String },

    #[error("Life Kernel API error: {message}")]
    Internal { message: String },
}

impl KernelError {
    /// HTTP status for this error: 400 for caller faults, 502 for upstream
    /// faults, 500 for configuration and anything unanticipated.
    pub fn status(&self) -> StatusCode {
        match self {
            KernelError::InvalidInput => StatusCode::BAD_REQUEST,
            KernelError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            KernelError::UpstreamFailure { .. } => StatusCode::BAD_GATEWAY,
            KernelError::EmptyUpstreamResponse => StatusCode::BAD_GATEWAY,
            KernelError::MalformedJson { .. } => StatusCode::BAD_GATEWAY,
            KernelError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fixed caller-visible message; upstream bodies and offending text stay
    /// in the server logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            KernelError::InvalidInput => "Missing 'query' in request body",
            KernelError::NotConfigured => {
                "Life Kernel is not configured. Missing GEMINI_API_KEY."
            }
            KernelError::UpstreamFailure { .. } => "Life Kernel request to Gemini failed",
            KernelError::EmptyUpstreamResponse => "Empty response from Life Kernel model",
            KernelError::MalformedJson { .. } => "Life Kernel model returned invalid JSON",
            KernelError::Internal { .. } => "Internal error in Life Kernel API",
        }
    }
}

impl IntoResponse for KernelError {
    fn into_response(self) -> Response {
        match &self {
            KernelError::UpstreamFailure { .. }
            | KernelError::MalformedJson { .. }
            | KernelError::Internal { .. } => tracing::error!("{}", self),
            KernelError::NotConfigured | KernelError::EmptyUpstreamResponse => {
                tracing::warn!("{}", self)
            }
            KernelError::InvalidInput => tracing::debug!("{}", self),
        }

        (
            self.status(),
            [(header::CONTENT_TYPE, "application/json")],
            json!({ "error": self.public_message() }).to_string(),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for KernelError {
    fn from(err: anyhow::Error) -> Self {
        KernelError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for KernelError {
    fn from(err: serde_json::Error) -> Self {
        KernelError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for KernelError {
    fn from(err: reqwest::Error) -> Self {
        // Transport-level failures carry no upstream response; status 0 marks
        // "no response received" in the logs.
        KernelError::UpstreamFailure {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            body: err.to_string(),
        }
    }
}

/// Result type alias for Life Kernel operations
pub type Result<T> = std::result::Result<T, KernelError>;

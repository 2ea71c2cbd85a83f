//! Gemini generateContent client behind the [`KernelModel`] trait seam.

use crate::config::{Config, GeminiConfig};
use crate::error::{KernelError, Result};
use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Instruction prepended to every model call; pins the reply shape to JSON.
pub const SYSTEM_INSTRUCTION: &str = "You are the Life Kernel for a personal operating system. Given a user's query about their life, schedule, energy, or goals, respond with a short summary plus 2-4 concrete recommendations. Return ONLY valid JSON of the shape: {  \"summary\": string,   \"recommendations\": [{ \"title\": string, \"detail\": string }]}. Do not include any markdown or explanation outside of JSON.";

/// Provider seam for the gateway; implemented by [`GeminiClient`] in
/// production and by scripted stubs in tests.
#[async_trait]
pub trait KernelModel: Send + Sync {
    /// One generateContent round trip; returns the raw provider payload.
    async fn generate(&self, prompt: &str) -> Result<Value>;
}

/// REST client for the Gemini generateContent API
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct GenerationConfig<'a> {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl GeminiClient {
    pub fn new(cfg: &GeminiConfig, api_key: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .context("Failed to build reqwest client with timeout")?;

        Ok(Self {
            client,
            api_key,
            model: cfg.model.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    // The credential travels as a query parameter, so this URL must never be
    // logged.
    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        }
    }
}

#[async_trait]
impl KernelModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Value> {
        debug!(
            "Calling Gemini generateContent (model={}, prompt_chars={})",
            self.model,
            prompt.len()
        );

        // Exactly one attempt per inbound request: failures surface to the
        // caller instead of being retried.
        let response = self
            .client
            .post(self.endpoint())
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KernelError::UpstreamFailure {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        Ok(payload)
    }
}

/// Prompt sent to the model: the fixed instruction plus the caller's query.
pub fn assemble_prompt(query: &str) -> String {
    format!("{SYSTEM_INSTRUCTION}\n\nUser query: {query}")
}

/// Build the provider client when a usable credential is configured.
/// `Ok(None)` means the service runs unconfigured and the gateway answers
/// with a configuration error per request.
pub fn create_model(config: &Config) -> anyhow::Result<Option<Arc<dyn KernelModel>>> {
    let is_placeholder = |s: &str| {
        let t = s.trim();
        t.is_empty()
            || t.contains("${")
            || t.eq_ignore_ascii_case("your-api-key-here")
            || t.eq_ignore_ascii_case("changeme")
    };

    let key = match config
        .gemini
        .api_key
        .as_deref()
        .filter(|k| !is_placeholder(k))
    {
        Some(k) => k.to_string(),
        None => return Ok(None),
    };

    let client = GeminiClient::new(&config.gemini, key)?;
    info!(
        "Using Gemini generateContent (model={})",
        config.gemini.model
    );
    Ok(Some(Arc::new(client)))
}

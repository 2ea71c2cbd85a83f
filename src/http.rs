//! HTTP transport for the Life Kernel service.
//!
//! Axum-based server exposing the kernel endpoint plus plain-JSON health,
//! info, and metrics endpoints. The kernel handler is the request gateway:
//! it validates the body, talks to the model once, and normalizes the reply.

use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::{cmp::Ordering, sync::Arc};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::error::{KernelError, Result};
use crate::gemini::{KernelModel, assemble_prompt};
use crate::normalizer;
use crate::schemas::KernelResponse;

/// Shared state for HTTP server
#[derive(Clone)]
pub struct HttpState {
    pub config: Arc<Config>,
    /// `None` when no usable credential was configured at startup; the kernel
    /// handler then answers with the configuration error per request.
    pub model: Option<Arc<dyn KernelModel>>,
    pub metrics: Arc<Mutex<HttpMetrics>>,
}

impl HttpState {
    pub fn new(config: Arc<Config>, model: Option<Arc<dyn KernelModel>>) -> Self {
        Self {
            config,
            model,
            metrics: Arc::new(Mutex::new(HttpMetrics::new())),
        }
    }
}

/// Metrics for HTTP server
#[derive(Debug, Clone)]
pub struct HttpMetrics {
    pub total_requests: u64,
    pub last_request_unix: u64,
    pub errors_total: u64,
    pub latencies: Vec<f64>, // ring buffer for p95
}

impl HttpMetrics {
    fn new() -> Self {
        Self {
            total_requests: 0,
            last_request_unix: std::time::SystemTime::UNIX_EPOCH
                .elapsed()
                .unwrap_or_default()
                .as_secs(),
            errors_total: 0,
            latencies: Vec::with_capacity(256),
        }
    }
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Info endpoint; reports the configured model, never the credential.
pub async fn info_handler(State(state): State<HttpState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        json!({
            "model": state.config.gemini.model,
            "configured": state.model.is_some(),
            "bind": state.config.http.bind.to_string()
        })
        .to_string(),
    )
}

/// Metrics endpoint
pub async fn metrics_handler(State(state): State<HttpState>) -> impl IntoResponse {
    let metrics = state.metrics.lock().await.clone();

    let (avg_latency_ms, p95_latency_ms) = if metrics.latencies.is_empty() {
        (None, None)
    } else {
        let sum: f64 = metrics.latencies.iter().sum();
        let avg = sum / metrics.latencies.len() as f64;
        let mut sorted = metrics.latencies.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let p95_idx = (sorted.len() as f64 * 0.95) as usize;
        let p95 = sorted.get(p95_idx).copied();
        (Some(avg), p95)
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        json!({
            "metrics_version": "1",
            "total_requests": metrics.total_requests,
            "last_request_unix": metrics.last_request_unix,
            "errors_total": metrics.errors_total,
            "avg_latency_ms": avg_latency_ms,
            "p95_latency_ms": p95_latency_ms
        })
        .to_string(),
    )
}

/// Life Kernel endpoint: validate, call the model once, normalize the reply.
pub async fn kernel_handler(
    State(state): State<HttpState>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let response = handle_kernel(&state, &body).await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        serde_json::to_string(&response)?,
    ))
}

async fn handle_kernel(state: &HttpState, body: &[u8]) -> Result<KernelResponse> {
    let parsed: Value = serde_json::from_slice(body).map_err(|e| KernelError::Internal {
        message: format!("invalid request body: {}", e),
    })?;

    let query = match parsed.get("query").and_then(Value::as_str) {
        Some(q) if !q.is_empty() => q,
        _ => return Err(KernelError::InvalidInput),
    };

    let model = state.model.as_ref().ok_or(KernelError::NotConfigured)?;

    let payload = model.generate(&assemble_prompt(query)).await?;
    normalizer::normalize(&payload)
}

/// Build the router with CORS and request metrics layers applied.
pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/api/life-kernel", post(kernel_handler))
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .route("/metrics", get(metrics_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            |State(metrics): State<Arc<Mutex<HttpMetrics>>>,
             req: axum::http::Request<Body>,
             next: axum::middleware::Next| async move {
                let is_kernel = req.uri().path() == "/api/life-kernel";
                let start = if is_kernel {
                    Some(std::time::Instant::now())
                } else {
                    None
                };
                let resp = next.run(req).await;
                if let Some(start_time) = start {
                    let latency_ms = start_time.elapsed().as_millis() as f64;
                    let mut m = metrics.lock().await;
                    if latency_ms > 0.0 {
                        m.latencies.push(latency_ms);
                        if m.latencies.len() > 256 {
                            m.latencies.remove(0);
                        }
                    }
                    if !resp.status().is_success() {
                        m.errors_total = m.errors_total.saturating_add(1);
                    }
                    m.total_requests = m.total_requests.saturating_add(1);
                    m.last_request_unix = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap_or_default()
                        .as_secs();
                }
                resp
            },
        ))
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_http_server(
    config: Arc<Config>,
    model: Option<Arc<dyn KernelModel>>,
) -> Result<()> {
    let state = HttpState::new(config.clone(), model);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.http.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    tracing::info!(
        "Starting HTTP server on {} (model {})",
        config.http.bind,
        config.gemini.model
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    Ok(())
}

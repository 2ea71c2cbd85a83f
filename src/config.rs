//! Environment-driven configuration for the Life Kernel service.
//!
//! Everything is read once at startup and injected where it is needed; no code
//! on the request path touches the process environment.

use std::net::SocketAddr;

/// Service configuration assembled from the process environment
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub http: HttpConfig,
}

/// Gemini provider configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Credential for generateContent; absence surfaces as a per-request
    /// configuration error, never a startup crash.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_ms: u64,
}

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub bind: SocketAddr,
    pub log_level: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash-lite".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8780"
                .parse()
                .expect("default bind address should parse"),
            log_level: "life_kernel=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from env files and environment variables.
    pub fn load() -> anyhow::Result<Self> {
        // Load environment variables with smart fallbacks:
        // 1) KERNEL_ENV_FILE if set
        // 2) ./.env
        // 3) ../.env (repo root when running from a subdirectory)
        if let Ok(env_path) = std::env::var("KERNEL_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
            let core_present = std::env::var("GEMINI_API_KEY").is_ok()
                || std::env::var("KERNEL_HTTP_BIND").is_ok();
            if !core_present {
                let _ = dotenvy::from_path("../.env");
            }
        }

        let mut config = Self::default();

        config.gemini.api_key = std::env::var("GEMINI_API_KEY").ok();
        if let Ok(model) = std::env::var("GEMINI_MODEL")
            && !model.trim().is_empty()
        {
            config.gemini.model = model;
        }
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL")
            && !base_url.trim().is_empty()
        {
            config.gemini.base_url = base_url;
        }
        if let Some(timeout) = std::env::var("GEMINI_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.gemini.timeout_ms = timeout;
        }
        if let Ok(v) = std::env::var("KERNEL_HTTP_BIND")
            && let Ok(bind) = v.parse::<SocketAddr>()
        {
            config.http.bind = bind;
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.http.log_level = level;
        }

        // Validate: warn on odd values rather than refusing to start
        if !config.gemini.base_url.starts_with("http://")
            && !config.gemini.base_url.starts_with("https://")
        {
            tracing::warn!(
                "Gemini base URL '{}' doesn't start with http:// or https://",
                config.gemini.base_url
            );
        }
        if config.gemini.timeout_ms < 1_000 {
            tracing::warn!(
                "GEMINI_TIMEOUT_MS {} is below 1000, clamping to 1000",
                config.gemini.timeout_ms
            );
            config.gemini.timeout_ms = 1_000;
        }

        Ok(config)
    }
}

//! Life Kernel service entry point

use anyhow::Result;
use life_kernel::{config::Config, gemini, http::start_http_server};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(config.http.log_level.clone())
        .with_ansi(false)
        .init();

    let config = Arc::new(config);
    let model = gemini::create_model(&config)?;
    if model.is_none() {
        tracing::warn!(
            "GEMINI_API_KEY is not set; /api/life-kernel will answer with a configuration error until it is"
        );
    }

    info!(
        "Life Kernel starting (model={}, bind={})",
        config.gemini.model, config.http.bind
    );

    start_http_server(config, model).await?;

    Ok(())
}

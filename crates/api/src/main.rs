use anyhow::{Context, Result};
use api::{AppState, build_router, config::AppConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().await?;

    // Initialize tracing
    if config.server.json_logs {
        tracing_subscriber::fmt().json().init();
    } else {
        tracing_subscriber::fmt::init();
    }

    let state = Arc::new(AppState::new(&config));
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;

    tracing::info!(
        addr = %config.server.bind_addr,
        cache = config.cache.enabled,
        strict_shape = config.normalizer.strict_shape,
        "Server listening"
    );

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

//! DocChat API Server
//!
//! HTTP server for uploading PDFs and chatting with their contents.

use docchat_api::{create_router, state::AppState};
use docchat_core::config::AppConfig;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(config.logging.include_location)
        .with_line_number(config.logging.include_location);
    if config.logging.json_format {
        fmt.json().init();
    } else {
        fmt.init();
    }

    tokio::fs::create_dir_all(&config.storage.upload_dir).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = Arc::new(AppState::new(config)?);

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("DocChat API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

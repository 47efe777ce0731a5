mod config;
mod errors;
mod ingest;
mod llm_client;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::ingest::extractor::ExtractorConfig;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interviewer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize generation client
    let llm = LlmClient::new(config.llm_config()).context("Failed to build HTTP client")?;
    info!(
        "Generation client initialized (model: {}, timeout: {}s, attempts: {})",
        llm.model(),
        config.generation_timeout_secs,
        config.generation_max_attempts
    );

    let extractor = ExtractorConfig {
        max_bytes: config.max_upload_bytes,
        scratch_dir: config.scratch_dir.clone(),
    };
    info!(
        "Uploads capped at {} bytes, scratch dir {}",
        extractor.max_bytes,
        extractor.scratch_dir.display()
    );

    // Build app state
    let state = AppState {
        generator: Arc::new(llm),
        extractor,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

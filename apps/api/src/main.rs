mod classification;
mod config;
mod db;
mod errors;
mod experience;
mod extraction;
mod llm_client;
mod models;
mod routes;
mod skills;
mod state;
mod store;
mod text;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{BackendClient, OllamaClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_PKG_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting extractor v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.batch_concurrency).await?;

    // Initialize model backend client
    let backend = OllamaClient::new(
        &config.ollama_host,
        &config.ollama_model,
        config.timeouts.liveness,
    );
    let status = backend.probe().await;
    match status.usable_model() {
        Some(model) => info!(host = %config.ollama_host, model, "Model backend reachable"),
        None => warn!(
            host = %config.ollama_host,
            "Model backend unreachable at startup, deterministic fallbacks only until it returns"
        ),
    }

    let state = AppState::new(db, Arc::new(backend), config.clone());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

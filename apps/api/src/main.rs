mod auth;
mod config;
mod db;
mod download;
mod errors;
mod models;
mod render;
mod resumes;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::render::{HtmlPdfRenderer, MinimalPdfRenderer, WkhtmltopdfEngine};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeForge API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize the HTML-to-PDF engine and surface a missing binary now
    // rather than on the first POST download.
    let engine = WkhtmltopdfEngine::new(
        config.pdf_engine_bin.clone(),
        Duration::from_secs(config.pdf_engine_timeout_secs),
    );
    match engine.probe().await {
        Ok(()) => info!("HTML-to-PDF engine ready ({})", config.pdf_engine_bin),
        Err(e) => warn!("HTML-to-PDF engine probe failed: {e} — inline downloads will error"),
    }

    // Build app state
    let state = AppState::new(
        db,
        config.clone(),
        Arc::new(MinimalPdfRenderer),
        Arc::new(HtmlPdfRenderer::new(Arc::new(engine))),
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

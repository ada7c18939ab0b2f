mod backend_client;
mod config;
mod errors;
mod explanation;
mod generation;
mod metrics;
mod models;
mod routes;
mod segmentation;
mod state;
mod whatif;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend_client::BackendClient;
use crate::config::Config;
use crate::explanation::BackendExplainer;
use crate::routes::build_router;
use crate::segmentation::BackendSegmenter;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PromptLens API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize backend client
    let backend = BackendClient::new(
        config.backend_url.clone(),
        Duration::from_secs(config.backend_timeout_secs),
    )?;
    match &config.backend_url {
        Some(url) => info!("Backend client initialized ({url})"),
        None => warn!("BACKEND_URL not set: segmentation and explanations are heuristic-only, generation and metrics are disabled"),
    }

    // Initialize segmenter and explainer (backend first, heuristic fallback in the handlers)
    let segmenter = Arc::new(BackendSegmenter(backend.clone()));
    let explainer = Arc::new(BackendExplainer(backend.clone()));

    if let Some(seed) = config.heuristic_seed {
        info!("Heuristic RNG seeded with {seed}");
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        backend,
        segmenter,
        explainer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS once the frontend origin is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

mod activities;
mod config;
mod db;
mod errors;
mod evaluation;
mod leads;
mod llm_client;
mod messaging;
mod models;
mod qualification;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::evaluation::EvaluationHistory;
use crate::llm_client::GrokClient;
use crate::routes::build_router;
use crate::state::AppState;

/// Retained evaluation runs before the oldest are dropped.
const EVALUATION_HISTORY_CAPACITY: usize = 50;

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

    info!("Starting SDR API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize completion client
    let completions = Arc::new(GrokClient::new(&config));
    info!("Completion client initialized (model: {})", config.grok_model);

    // Evaluation history lives for the process; cleared via the API
    let eval_history = Arc::new(EvaluationHistory::new(EVALUATION_HISTORY_CAPACITY));

    // Build app state
    let state = AppState {
        db,
        completions,
        eval_history,
    };

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

mod config;
mod errors;
mod insights;
mod llm_client;
mod orchestrator;
mod routes;
mod salary;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::orchestrator::session::SessionStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting salary API v{}", env!("CARGO_PKG_VERSION"));

    if config.gemini_api_key.is_none() {
        warn!(
            "GEMINI_API_KEY is not set; coefficient lookups will fall back and insights will fail"
        );
    }

    // Initialize LLM client
    let llm = GeminiClient::new(
        config.gemini_base_url.clone(),
        config.gemini_api_key.clone(),
        Duration::from_secs(config.llm_timeout_secs),
        config.llm_max_attempts,
    )
    .context("Failed to build HTTP client")?;
    info!(
        "LLM client initialized (coefficients: {}, insights: {})",
        config.coefficient_model, config.insight_model
    );
    info!(
        "Fallback salary model: base={} slope={}",
        config.fallback_model.base, config.fallback_model.slope
    );

    let sessions = SessionStore::new(chrono::Duration::minutes(config.session_idle_minutes));
    let state = AppState::new(config.clone(), Arc::new(llm), sessions);

    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::permissive().allow_origin(
            origin
                .parse::<HeaderValue>()
                .context("CORS_ORIGIN must be a valid header value")?,
        ),
        None => CorsLayer::permissive(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

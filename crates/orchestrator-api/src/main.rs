// Orchestrator API server
// Decision: Stateless HTTP front for the router; every request carries its own context
// Decision: Streamed answers are exposed both as a JSON array and as SSE

mod config;
mod orchestrate;

use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Json, Router};
use orchestrator_core::Router as OrchestrationRouter;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    strategy: &'static str,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    strategy: &'static str,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        strategy: state.strategy,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orchestrator_api=debug,orchestrator_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("orchestrator-api starting...");

    let config = ServerConfig::from_env().context("Invalid orchestrator configuration")?;
    let router = OrchestrationRouter::new(&config.router);
    tracing::info!(
        strategy = router.strategy_name(),
        stream_interval_ms = config.router.stream_interval_ms,
        answer_tool = %config.router.answer_tool,
        "Orchestration router configured"
    );

    // Example: API_PREFIX="/api" results in routes like /api/v1/orchestrate
    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }

    let app = build_app(router, &config.api_prefix).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", config.addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Health (never prefixed) plus the prefixed orchestration routes
fn build_app(router: OrchestrationRouter, api_prefix: &str) -> Router {
    let health_state = HealthState {
        strategy: router.strategy_name(),
    };
    let api_routes = orchestrate::routes(orchestrate::AppState::new(router));

    Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(build_router_with_prefix(api_routes, api_prefix))
}

/// Build router with optional API prefix (extracted for testing)
fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

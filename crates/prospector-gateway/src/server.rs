//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{get, post},
};
use prospector_agent::Orchestrator;
use prospector_core::config::ProspectorConfig;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub start_time: std::time::Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);
    Router::new()
        .route("/ingest", post(super::routes::ingest))
        .route("/chat", post(super::routes::chat))
        .route("/search", post(super::routes::search))
        .route("/health", get(super::routes::health_check))
        .route("/stats", get(super::routes::stats))
        .layer(
            CorsLayer::new()
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST, axum::http::Method::OPTIONS])
                .allow_headers(Any)
                .allow_origin(Any)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server.
pub async fn start(config: ProspectorConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let orchestrator = Orchestrator::from_config(config)?;
    let stats = orchestrator.stats().await;
    tracing::info!(
        "📚 Knowledge loaded: {} nodes, {} edges, {} chunks",
        stats.nodes,
        stats.edges,
        stats.chunks
    );

    let app = build_router(AppState {
        orchestrator: Arc::new(orchestrator),
        start_time: std::time::Instant::now(),
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

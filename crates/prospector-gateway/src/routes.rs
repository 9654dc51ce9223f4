//! API route handlers for the gateway.

use axum::{Json, extract::State};
use prospector_core::config::expand_path;
use std::sync::Arc;

use crate::server::AppState;

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ok": true,
        "status": "ok",
        "service": "prospector-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Knowledge store sizes.
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let stats = state.orchestrator.stats().await;
    Json(serde_json::json!({
        "ok": true,
        "nodes": stats.nodes,
        "edges": stats.edges,
        "chunks": stats.chunks,
        "dimension": stats.dimension,
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Rebuild the knowledge stores from a document. Without a `path` the
/// configured document is used.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    let configured = &state.orchestrator.config().ingest.document_path;
    let path = body["path"].as_str().unwrap_or(configured);
    let status = state.orchestrator.ingest(&expand_path(path)).await;
    Json(serde_json::json!({"status": status}))
}

/// Answer a question. `api_url` overrides the configured generation endpoint.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    let message = body["message"].as_str().unwrap_or("").trim();
    if message.is_empty() {
        return Json(serde_json::json!({"ok": false, "error": "message is required"}));
    }
    let default_endpoint = &state.orchestrator.config().generation.endpoint;
    let endpoint = body["api_url"].as_str().unwrap_or(default_endpoint);
    let response = state.orchestrator.answer(message, endpoint).await;
    Json(serde_json::json!({"response": response}))
}

/// Raw vector search over the chunk index.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    let query = body["query"].as_str().unwrap_or("");
    let top_k = body["top_k"]
        .as_u64()
        .map_or(state.orchestrator.config().index.top_k, |k| k as usize);

    match state.orchestrator.search(query, top_k).await {
        Ok(results) => Json(serde_json::json!({"ok": true, "count": results.len(), "results": results})),
        Err(e) => Json(serde_json::json!({"ok": false, "error": e.to_string()})),
    }
}

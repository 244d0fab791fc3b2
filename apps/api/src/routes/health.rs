use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::llm_client::BackendStatus;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "extractor-api"
    }))
}

/// GET /api/v1/backend/status
/// Probes the model backend. Never fails; an unreachable backend is a normal answer.
pub async fn backend_status_handler(State(state): State<AppState>) -> Json<BackendStatus> {
    Json(state.backend.probe().await)
}

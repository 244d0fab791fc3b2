pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::skills::handlers as skills;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/backend/status", get(health::backend_status_handler))
        // Extraction
        .route("/api/v1/extract", post(extraction::handle_extract_text))
        .route(
            "/api/v1/resumes/:id/extract",
            post(extraction::handle_extract_resume),
        )
        .route(
            "/api/v1/resumes/extract-batch",
            post(extraction::handle_extract_batch),
        )
        // Skills
        .route("/api/v1/skills/normalize", post(skills::handle_normalize_skills))
        .with_state(state)
}

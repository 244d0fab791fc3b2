use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::BackendError;

/// Why a single extraction tier produced nothing.
///
/// Inside the experience and classification chains every variant is recovered
/// locally by moving on to the next tier or default. Only the skill chain lets
/// `BackendUnreachable` / `BackendTimeout` escape to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("backend unreachable: {0}")]
    BackendUnreachable(String),

    #[error("backend timed out after {0:?}")]
    BackendTimeout(std::time::Duration),

    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("no match")]
    NoMatch,
}

impl From<BackendError> for ExtractionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unreachable(msg) => ExtractionError::BackendUnreachable(msg),
            BackendError::Timeout(after) => ExtractionError::BackendTimeout(after),
            // A non-success status means the backend answered but could not serve the call.
            BackendError::Status { status, message } => {
                ExtractionError::BackendUnreachable(format!("status {status}: {message}"))
            }
            BackendError::MalformedResponse(msg) => ExtractionError::MalformedResponse(msg),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_backend_timeout_maps_to_timeout() {
        let err: ExtractionError = BackendError::Timeout(Duration::from_secs(5)).into();
        assert_eq!(err, ExtractionError::BackendTimeout(Duration::from_secs(5)));
    }

    #[test]
    fn test_backend_status_counts_as_unreachable() {
        let err: ExtractionError = BackendError::Status {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert!(matches!(err, ExtractionError::BackendUnreachable(_)));
    }

    #[test]
    fn test_not_found_status_code() {
        let response = AppError::NotFound("Resume 7 not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_status_code() {
        let response = AppError::Validation("text must not be empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Booking not found")]
    NotFound,

    #[error("Package not found: {0}")]
    PackageNotFound(i32),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Invalid refund policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid status transition: {0}")]
    IllegalTransition(String),

    #[error("Refund not eligible: {0}")]
    RefundNotEligible(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            BookingError::NotFound => (StatusCode::NOT_FOUND, "Booking not found".to_string()),
            BookingError::PackageNotFound(id) => (
                StatusCode::BAD_REQUEST,
                format!("Package with id {} not found", id),
            ),
            // Id and token collisions are internal invariant violations,
            // never retried automatically
            BookingError::DuplicateKey(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            BookingError::InvalidPolicy(msg) => (StatusCode::BAD_REQUEST, msg),
            BookingError::IllegalTransition(msg) => (StatusCode::CONFLICT, msg),
            BookingError::RefundNotEligible(msg) => (StatusCode::CONFLICT, msg),
            BookingError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failure body returned by every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Faults in the request itself. Capability failures never come through
/// here; they are ordinary replies carrying an `error_kind`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] JsonRejection),
    #[error("Invalid path: {0}")]
    Path(#[from] PathRejection),
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Not Found: {0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match &self {
            ApiError::Json(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::Path(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        tracing::debug!(status = %status_code, "Request rejected: {}", self);
        (status_code, Json(ErrorResponse::new(error_message))).into_response()
    }
}

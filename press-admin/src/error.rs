//! Error types for press-admin
//!
//! Every error renders as `{ "error": "<message>" }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::import::ImportError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller is not signed in (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Upload exceeds the configured size limit (413)
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Import could not run at all (400)
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Internal server error (500); the message is shown to the caller
    #[error("{0}")]
    Internal(String),

    /// press-common error (500); details are logged, not returned
    #[error("Common error: {0}")]
    Common(#[from] press_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::Import(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Common(err) => {
                tracing::error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

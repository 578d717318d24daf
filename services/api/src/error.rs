//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use course_forge_core::{GenerationError, PortError};
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request body could not be parsed at all.
    #[error("Failed to parse request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("Missing or invalid x-user-id header")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// The client went away before generation finished.
    #[error("Request was cancelled")]
    Cancelled,

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            GenerationError::Cancelled => ApiError::Cancelled,
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::Port(PortError::Unauthorized) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Port(PortError::LimitReached(_)) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            // Nobody is listening; the status only shows up in logs.
            ApiError::Cancelled => StatusCode::REQUEST_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Every error leaves the service as `{ "error": string }`.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

//! Error types for songbook-catalog
//!
//! `CatalogError` is the taxonomy shared by the store, the lookup client and
//! the catalog service. `ApiError` maps it onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Catalog operation errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No song with the requested id
    #[error("song not found")]
    NotFound,

    /// A song with the same (group, song) pair already exists
    #[error("song already exists")]
    AlreadyExists,

    /// Inbound request is missing a required field
    #[error("validation failed: {0}")]
    Validation(String),

    /// External lyrics lookup failed
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Lookup returned a release date not in `DD.MM.YYYY` format
    #[error("invalid release date {value:?}: {source}")]
    DateParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Any other persistence failure
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// External lookup failures, each distinguishable
#[derive(Debug, Error)]
pub enum LookupError {
    /// Lookup service rejected the request (400)
    #[error("bad external request")]
    BadRequest,

    /// Lookup service failed internally (500)
    #[error("external service error (status {0})")]
    ServiceError(u16),

    /// Lookup service answered with an unexpected status
    #[error("external service unreachable (status {0})")]
    Unreachable(u16),

    /// Request could not be sent or the response not received
    #[error("external request failed: {0}")]
    Transport(String),

    /// Response body was not a valid song detail
    #[error("failed to decode external response: {0}")]
    Decode(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - song already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream lookup failure (502)
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound => ApiError::NotFound(err.to_string()),
            CatalogError::AlreadyExists => ApiError::Conflict(err.to_string()),
            CatalogError::Validation(msg) => ApiError::BadRequest(msg),
            CatalogError::Lookup(LookupError::BadRequest) => ApiError::BadRequest(err.to_string()),
            CatalogError::Lookup(_) | CatalogError::DateParse { .. } => {
                ApiError::BadGateway(err.to_string())
            }
            CatalogError::Store(ref e) => {
                // Store details stay in the log
                error!(error = %e, "Store operation failed");
                ApiError::Internal("internal error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

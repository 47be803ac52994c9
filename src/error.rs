//! Error types for the offline cache
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the offline cache.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Upstream transport failure or unusable upstream response
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream fetch did not settle within the allotted time
    #[error("Network timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The backing store rejected an operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// A write would push a partition past the store's quota
    #[error("Quota exceeded in partition '{partition}': {requested} bytes requested, {available} available")]
    QuotaExceeded {
        partition: String,
        requested: u64,
        available: u64,
    },

    /// Invalid or unusable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Operation not allowed in the worker's current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Priming the caches during install failed
    #[error("Install failed: {0}")]
    Install(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// True for failures that originate on the network side of a fetch.
    pub fn is_network(&self) -> bool {
        matches!(self, CacheError::Network(_) | CacheError::Timeout(_))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Network(_) => StatusCode::BAD_GATEWAY,
            CacheError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CacheError::QuotaExceeded { .. } => StatusCode::INSUFFICIENT_STORAGE,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidState(_) => StatusCode::CONFLICT,
            CacheError::Install(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Storage(_) | CacheError::Config(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the offline cache.
pub type Result<T> = std::result::Result<T, CacheError>;

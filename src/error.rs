//! Error types for the cache facade
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache facade, its adapters and the HTTP surface.
///
/// A cache miss is never represented here; lookups return `Option`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// No adapters registered, or a backend setting is missing or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Every registered adapter reported itself unusable
    #[error("No suitable adapter found among: {0}")]
    NoSuitableAdapter(String),

    /// The disk backend's file exists but cannot be parsed
    #[error("Corrupt cache file {}: {reason}", path.display())]
    CorruptCacheFile { path: PathBuf, reason: String },

    /// A value could not be encoded for storage or decoded on read
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure inside the disk backend
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid request data (HTTP surface)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not found (HTTP surface)
    #[error("Key not found: {0}")]
    NotFound(String),
}

impl CacheError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::Serialization(_) => {
                StatusCode::BAD_REQUEST
            }
            CacheError::Configuration(_)
            | CacheError::NoSuitableAdapter(_)
            | CacheError::CorruptCacheFile { .. }
            | CacheError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache facade.
pub type Result<T> = std::result::Result<T, CacheError>;

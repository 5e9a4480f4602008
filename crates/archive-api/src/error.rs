//! Error types for backend API calls.

use thiserror::Error;

/// Errors that can occur while talking to the ArcHive backend.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (backend unreachable, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend answered with a non-success status
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Backend rejected the session; local session state has been cleared
    #[error("Session rejected by backend")]
    Unauthorized,

    /// Reading or clearing the persisted session failed
    #[error("Storage error: {0}")]
    Storage(#[from] archive_storage::StorageError),
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;

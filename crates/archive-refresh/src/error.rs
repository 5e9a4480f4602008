//! Error types for the daily refresh service.

use thiserror::Error;

/// Errors that can occur during a reconciliation run or while consuming
/// the server event stream.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// Backend call failed
    #[error("API error: {0}")]
    Api(#[from] archive_api::ApiError),

    /// Checkpoint read/write failed
    #[error("storage error: {0}")]
    Storage(#[from] archive_storage::StorageError),

    /// Event stream transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Event stream delivered something unusable
    #[error("event stream error: {0}")]
    Stream(String),
}

/// Result type alias using RefreshError.
pub type RefreshResult<T> = Result<T, RefreshError>;

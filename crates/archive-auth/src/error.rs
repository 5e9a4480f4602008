//! Error types for auth operations.
//!
//! Every auth operation resolves to an `AuthResult`; nothing panics and
//! no transport error escapes unwrapped. The `Display` of each variant
//! is the user-facing message.

use thiserror::Error;

/// Errors that can occur during an auth sequence.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Backend rejected the credentials (in-band error payload)
    #[error("{0}")]
    Backend(String),

    /// The createSession step errored or omitted a token
    #[error("session creation failed")]
    SessionCreation,

    /// Backend returned a user payload in no recognizable shape
    #[error("malformed user payload")]
    InvalidUser,

    /// Transport or backend failure on a required step
    #[error("network error: {0}")]
    Network(#[from] archive_api::ApiError),

    /// Persisting or reading the session failed
    #[error("storage error: {0}")]
    Storage(#[from] archive_storage::StorageError),
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

//! HTTP client wrapper and typed RPC surface for the ArcHive backend.
//!
//! Every backend operation is a JSON-over-POST call. The wrapper owns the
//! cross-cutting behavior:
//!
//! 1. **Credential injection**: when a session token is in storage it is
//!    attached as a bearer header on every request and, outside the
//!    authenticate/createSession/register set, also copied into the body
//!    as a `sessionToken` field (some backend routes read the token from
//!    the body, not the header).
//! 2. **Global 401 handling**: any 401 clears the persisted session and
//!    forces navigation to the login route, regardless of which call hit
//!    it.
//!
//! Note the backend may also answer 200 with an `{"error": "..."}` body;
//! [`error_field`] surfaces that and callers decide what it means.

mod client;
mod endpoints;
mod error;
mod types;

pub use client::{error_field, ApiClient};
pub use error::{ApiError, ApiResult};
pub use types::{ArcDetail, ProgressEntry, UserRef};

//! Session and auth lifecycle for the ArcHive client.
//!
//! [`AuthStore`] owns the current user and session token, orchestrates
//! the multi-step login/register/logout sequences against the backend,
//! and persists the session across restarts. Memory and storage are
//! written together at every observable point, so a crash never leaves
//! them disagreeing.

mod error;
mod store;
mod user;

pub use error::{AuthError, AuthResult};
pub use store::{AuthPhase, AuthStore};
pub use user::UserIdentity;

//! Well-known storage keys.
//!
//! The key names match the wire-level values the backend and earlier
//! clients already use, so a store populated by one client version stays
//! readable by the next.

/// Namespace for all persisted client state.
pub struct StorageKeys;

impl StorageKeys {
    /// Session token issued by the createSession endpoint.
    pub const TOKEN: &'static str = "token";

    /// Current user record, JSON-encoded.
    pub const USER: &'static str = "user";

    /// Calendar date of the last completed daily refresh run.
    pub const LAST_DAILY_REFRESH: &'static str = "lastDailyRefresh";
}

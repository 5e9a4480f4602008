//! Key-value storage abstraction for the ArcHive client.
//!
//! The session store and the daily refresh service both persist small
//! string values (token, user record, refresh checkpoint). Rather than
//! touching a concrete store directly, they receive a [`KeyValueStore`]
//! capability, satisfied by different backends per platform:
//! - [`MemoryStore`]: ephemeral, used in tests and `--ephemeral` runs
//! - [`JsonFileStore`]: a single JSON object file with atomic writes

mod json_file;
mod keys;
mod memory;
mod traits;

pub use json_file::JsonFileStore;
pub use keys::StorageKeys;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO error from a file-backed store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A lock guarding the store was poisoned
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();

        store.set("token", "tok123").unwrap();
        assert_eq!(store.get("token").unwrap(), Some("tok123".to_string()));
        assert!(store.has("token").unwrap());

        assert!(store.remove("token").unwrap());
        assert!(!store.remove("token").unwrap());
        assert_eq!(store.get("token").unwrap(), None);
        assert!(!store.has("token").unwrap());
    }

    #[test]
    fn storage_keys_are_unique() {
        let keys = [
            StorageKeys::TOKEN,
            StorageKeys::USER,
            StorageKeys::LAST_DAILY_REFRESH,
        ];
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }
}

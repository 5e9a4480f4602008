//! Storage trait definitions.

use crate::StorageResult;

/// Trait for key-value storage backends.
pub trait KeyValueStore: Send + Sync {
    /// Store a value under a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Remove a value. Returns whether a value was present.
    fn remove(&self, key: &str) -> StorageResult<bool>;

    /// Check if a key exists.
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

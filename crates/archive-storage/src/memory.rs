//! In-memory storage backend.

use crate::traits::KeyValueStore;
use crate::{StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Ephemeral in-memory store.
///
/// Nothing survives process exit. Used by tests and `--ephemeral` runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.lock().map_err(|_| StorageError::Poisoned)?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self.data.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(data.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        let mut data = self.data.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(data.remove(key).is_some())
    }
}

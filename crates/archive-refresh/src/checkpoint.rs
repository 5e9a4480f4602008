//! The at-most-once-per-day checkpoint.
//!
//! A single calendar-date string, cached in memory and persisted under
//! `lastDailyRefresh`. Mutated only after a reconciliation run completes
//! successfully.

use crate::RefreshResult;
use archive_storage::{KeyValueStore, StorageKeys};
use std::sync::{Arc, Mutex};
use tracing::debug;

pub(crate) struct RefreshCheckpoint {
    storage: Arc<dyn KeyValueStore>,
    cached: Mutex<Option<String>>,
}

impl RefreshCheckpoint {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            cached: Mutex::new(None),
        }
    }

    /// Load the persisted date into the cache. Called when the service
    /// starts.
    pub fn load(&self) -> RefreshResult<()> {
        let stored = self.storage.get(StorageKeys::LAST_DAILY_REFRESH)?;
        *self.cached.lock().expect("checkpoint lock poisoned") = stored;
        Ok(())
    }

    /// The date of the last completed run, if any.
    pub fn last(&self) -> Option<String> {
        self.cached.lock().expect("checkpoint lock poisoned").clone()
    }

    /// Record a completed run for `date`, in memory and storage.
    pub fn advance(&self, date: &str) -> RefreshResult<()> {
        *self.cached.lock().expect("checkpoint lock poisoned") = Some(date.to_string());
        self.storage.set(StorageKeys::LAST_DAILY_REFRESH, date)?;
        debug!(date, "Refresh checkpoint advanced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archive_storage::MemoryStore;

    #[test]
    fn load_and_advance_roundtrip() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(StorageKeys::LAST_DAILY_REFRESH, "2026-08-28").unwrap();

        let checkpoint = RefreshCheckpoint::new(storage.clone());
        assert_eq!(checkpoint.last(), None);

        checkpoint.load().unwrap();
        assert_eq!(checkpoint.last(), Some("2026-08-28".to_string()));

        checkpoint.advance("2026-08-29").unwrap();
        assert_eq!(checkpoint.last(), Some("2026-08-29".to_string()));
        assert_eq!(
            storage.get(StorageKeys::LAST_DAILY_REFRESH).unwrap(),
            Some("2026-08-29".to_string())
        );
    }
}

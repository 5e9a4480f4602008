//! File-backed storage: one JSON object per store.
//!
//! Writes go to a temp file in the same directory followed by a rename,
//! so a crash mid-write leaves the previous contents intact.

use crate::traits::KeyValueStore;
use crate::{StorageError, StorageResult};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// JSON-file key-value store.
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open a store at `path`, creating parent directories as needed.
    /// A missing file is treated as an empty store; an unreadable one
    /// is an error (never silently discarded).
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)
                .map_err(|e| StorageError::Encoding(format!("{}: {}", path.display(), e)))?
        } else {
            HashMap::new()
        };

        debug!(path = %path.display(), "Opened JSON file store");

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Serialize the map and atomically replace the backing file.
    fn persist(&self, data: &HashMap<String, String>) -> StorageResult<()> {
        let encoded = serde_json::to_vec_pretty(data)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;

        let tmp = temp_path(&self.path);
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&encoded)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());
    name.push_str(".tmp");
    path.with_file_name(name)
}

impl KeyValueStore for JsonFileStore {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.lock().map_err(|_| StorageError::Poisoned)?;
        data.insert(key.to_string(), value.to_string());
        self.persist(&data)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self.data.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(data.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        let mut data = self.data.lock().map_err(|_| StorageError::Poisoned)?;
        let removed = data.remove(key).is_some();
        if removed {
            self.persist(&data)?;
        }
        Ok(removed)
    }
}

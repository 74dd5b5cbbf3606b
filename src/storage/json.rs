//! JSON file-based key-value store.
//!
//! This module provides a simple, human-readable storage implementation using
//! JSON serialization. It uses atomic file writes (write-to-temp + rename) to
//! prevent corruption on crashes.
//!
//! # Performance Characteristics
//!
//! - **Read**: O(1) - the whole document is loaded into memory once
//! - **Write**: O(n) - the whole document is rewritten on each change
//! - **Best for**: a few dozen small values, infrequent writes

use crate::domain::error::{PawfeedError, Result};
use crate::storage::backend::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

/// JSON storage container format.
///
/// ```json
/// {
///   "version": 1,
///   "values": {
///     "pawfeed.token": "eyJ...",
///     "pawfeed.language": "fi"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageData {
    /// Version of the storage format for future migrations.
    version: u32,

    #[serde(default)]
    values: BTreeMap<String, String>,
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            values: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
struct State {
    data: StorageData,
    /// Tracks if data has been modified since last save.
    dirty: bool,
}

/// JSON file [`KeyValueStore`].
///
/// The whole document lives in memory and is persisted after every change.
#[derive(Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
    state: Mutex<State>,
}

impl JsonFileStore {
    /// Creates or opens a JSON store at `file_path`.
    ///
    /// If the file exists its values are loaded; otherwise the store starts
    /// empty. Parent directories are created automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - The file exists but contains invalid JSON
    /// - File permissions prevent reading
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pawfeed::storage::{JsonFileStore, KeyValueStore};
    /// use std::path::PathBuf;
    ///
    /// let store = JsonFileStore::new(PathBuf::from("/tmp/pawfeed/storage.json"))?;
    /// store.set("pawfeed.language", "fi")?;
    /// # Ok::<(), pawfeed::PawfeedError>(())
    /// ```
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("initializing new empty store");
            StorageData::default()
        };

        tracing::debug!(value_count = data.values.len(), "store initialized");

        Ok(Self {
            file_path,
            state: Mutex::new(State { data, dirty: false }),
        })
    }

    fn load_from_file(path: &Path) -> Result<StorageData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StorageData = serde_json::from_str(&contents)
            .map_err(|e| PawfeedError::Storage(format!("failed to parse JSON: {e}")))?;

        if data.version > FORMAT_VERSION {
            return Err(PawfeedError::Storage(format!(
                "unsupported storage version {} (expected <= {FORMAT_VERSION})",
                data.version
            )));
        }

        tracing::debug!(version = data.version, values = data.values.len(), "loaded storage data");
        Ok(data)
    }

    /// Saves the document using an atomic write.
    ///
    /// Writes to a temporary file first, then renames it over the target so the
    /// file is never left half-written.
    fn save(&self, state: &mut State) -> Result<()> {
        if !state.dirty {
            tracing::trace!("skipping save, no changes");
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&state.data)
            .map_err(|e| PawfeedError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        state.dirty = false;
        tracing::trace!(path = ?self.file_path, "store saved");
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(&self, apply: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let mut state = self.state();
        if apply(&mut state.data.values) {
            state.dirty = true;
        }
        self.save(&mut state)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.state().data.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_set", key).entered();
        self.mutate(|values| values.insert(key.to_string(), value.to_string()).as_deref() != Some(value))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.mutate(|values| values.remove(key).is_some())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let _span = tracing::debug_span!("json_remove_many", count = keys.len()).entered();
        self.mutate(|values| {
            keys.iter()
                .fold(false, |changed, key| values.remove(*key).is_some() || changed)
        })
    }
}

impl Drop for JsonFileStore {
    /// Flushes dirty data left behind by a failed save.
    fn drop(&mut self) {
        let mut state = self.state();
        if state.dirty {
            tracing::debug!("saving dirty data on drop");
            if let Err(e) = self.save(&mut state) {
                tracing::error!(error = %e, "failed to save on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        {
            let store = JsonFileStore::new(path.clone()).unwrap();
            store.set("pawfeed.language", "fi").unwrap();
            store.set("pawfeed.token", "abc").unwrap();
            store.remove("pawfeed.token").unwrap();
        }

        let reopened = JsonFileStore::new(path).unwrap();
        assert_eq!(reopened.get("pawfeed.language").unwrap().as_deref(), Some("fi"));
        assert_eq!(reopened.get("pawfeed.token").unwrap(), None);
    }

    #[test]
    fn invalid_json_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(path).unwrap_err();
        assert!(matches!(err, PawfeedError::Storage(_)));
    }

    #[test]
    fn remove_many_writes_once_and_leaves_others() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("storage.json")).unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.set("c", "3").unwrap();

        store.remove_many(&["a", "b", "missing"]).unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap(), None);
        assert_eq!(store.get("c").unwrap().as_deref(), Some("3"));
    }
}

//! Durable client storage abstraction.
//!
//! The client persists a handful of string values (session token, serialized
//! user, preferences). [`KeyValueStore`] is the minimal surface needed: on the
//! web it maps onto `localStorage`, in the shell onto a JSON file.

use crate::domain::error::Result;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// String key-value storage that survives restarts.
///
/// # Implementations
///
/// - [`MemoryStore`]: process-local, for tests and ephemeral sessions
/// - [`JsonFileStore`](super::JsonFileStore): JSON document on disk with atomic writes
pub trait KeyValueStore: Send + Sync {
    /// Returns the value for `key`, or `None` if unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<()>;

    /// Removes several keys as one write where the backend supports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        keys.iter().try_for_each(|key| self.remove(key))
    }
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values().remove(key);
        Ok(())
    }
}

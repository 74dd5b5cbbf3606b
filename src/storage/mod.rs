//! Durable client storage.
//!
//! # Modules
//!
//! - `backend`: [`KeyValueStore`] trait and the in-memory implementation
//! - `json`: JSON file implementation with atomic writes
//! - `session`: [`ClientStorage`], typed access to session and preferences

pub mod backend;
pub mod json;
pub mod session;

pub use backend::{KeyValueStore, MemoryStore};
pub use json::JsonFileStore;
pub use session::{CartItem, ClientStorage, Language};

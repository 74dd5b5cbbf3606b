//! Domain layer for the pawfeed client.
//!
//! Core types shared by every other layer, independent of the platform adapters
//! (browser history, storage, HTTP transport).
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`models`]: Records exchanged with the HTTP API
//!
//! # Examples
//!
//! ```
//! use pawfeed::domain::{PawfeedError, Result};
//!
//! fn require_name(name: &str) -> Result<&str> {
//!     if name.trim().is_empty() {
//!         return Err(PawfeedError::Validation("name is required".to_string()));
//!     }
//!     Ok(name)
//! }
//! ```

pub mod error;
pub mod models;

pub use error::{ErrorKind, PawfeedError, Result};
pub use models::{
    Conversation, Dog, FeedPage, FeedScope, HealthRecord, HealthRecordKind, HealthStatus, Invite,
    Message, NewDog, NewHealthRecord, NewPost, Post, Session, UnreadCount, UploadTarget, User,
};

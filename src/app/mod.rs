//! Application layer: the context object and event dispatch.
//!
//! # Architecture
//!
//! ```text
//! Host input → Event → handle_event → Router / Overlays / Services
//!                            │                 │
//!                            └── popstate ◀── History
//! ```
//!
//! # Modules
//!
//! - [`state`]: [`App`], which owns one instance of every collaborator
//! - [`handler`]: [`Event`] and [`handle_event`]

pub mod handler;
pub mod state;

pub use handler::{handle_event, Event};
pub use state::{App, Platform, SearchResults};

//! Infrastructure layer for filesystem and environment interactions.
//!
//! Only the shell binary touches the filesystem; the library core works through
//! the storage, history and transport traits.

pub mod paths;

pub use paths::{data_dir, default_config_file, expand_tilde, expand_tilde_with, log_file, storage_file};

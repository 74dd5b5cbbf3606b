//! Filesystem locations used by the shell binary.
//!
//! Everything lives under one data directory, `~/.local/share/pawfeed` unless
//! configured otherwise:
//!
//! ```text
//! ~/.local/share/pawfeed/
//! ├── storage.json      durable client storage
//! └── pawfeed.log       rotated trace log
//! ```

use crate::domain::error::{PawfeedError, Result};
use std::path::{Path, PathBuf};

const STORAGE_FILE: &str = "storage.json";
const LOG_FILE: &str = "pawfeed.log";

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

/// Expands a leading `~` against `home`.
///
/// # Examples
///
/// ```
/// use pawfeed::infrastructure::expand_tilde_with;
/// use std::path::{Path, PathBuf};
///
/// let home = Path::new("/home/nelli");
/// assert_eq!(expand_tilde_with("~/pawfeed", Some(home)), PathBuf::from("/home/nelli/pawfeed"));
/// assert_eq!(expand_tilde_with("~", Some(home)), PathBuf::from("/home/nelli"));
/// assert_eq!(expand_tilde_with("/var/lib/pawfeed", Some(home)), PathBuf::from("/var/lib/pawfeed"));
/// assert_eq!(expand_tilde_with("~/pawfeed", None), PathBuf::from("~/pawfeed"));
/// ```
#[must_use]
pub fn expand_tilde_with(path: &str, home: Option<&Path>) -> PathBuf {
    match (path, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (path, Some(home)) if path.starts_with("~/") => home.join(&path[2..]),
        (path, _) => PathBuf::from(path),
    }
}

/// Expands a leading `~` against `$HOME`.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    expand_tilde_with(path, home_dir().as_deref())
}

/// Resolves the data directory: `configured` if set, else `~/.local/share/pawfeed`.
///
/// # Errors
///
/// Returns [`PawfeedError::Config`] when nothing is configured and `$HOME` is unset.
pub fn data_dir(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = configured.filter(|d| !d.trim().is_empty()) {
        return Ok(expand_tilde(dir.trim()));
    }
    home_dir()
        .map(|home| home.join(".local").join("share").join("pawfeed"))
        .ok_or_else(|| PawfeedError::Config("HOME is not set; configure data_dir".to_string()))
}

/// Default config file, `~/.config/pawfeed/config.toml`.
#[must_use]
pub fn default_config_file() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".config").join("pawfeed").join("config.toml"))
}

#[must_use]
pub fn storage_file(data_dir: &Path) -> PathBuf {
    data_dir.join(STORAGE_FILE)
}

#[must_use]
pub fn log_file(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE)
}

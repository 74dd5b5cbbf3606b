//! Pawfeed: client core for a social network for dog owners.
//!
//! Pawfeed covers dog profiles, a following/public feed, direct messaging,
//! health-record tracking and invites. This crate holds everything except
//! the pixels:
//! - A first-match client-side router with internal-link interception
//! - A modal-history coordinator that makes Back close overlays
//! - A view manager with liveness tokens against stale async writes
//! - Typed API services with client-side validation and toast error display
//! - Durable client storage for the session and preferences
//!
//! The browser is reached only through small traits (history, key-value
//! storage, HTTP transport, identity provider). The same core runs in a
//! browser adapter, in the headless shell binary, and in tests.

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Host (main.rs shell, browser adapter, tests)       │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │ Event
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - Event dispatch                                   │
//! │  - Route table                                      │
//! │  - Auth-driven polling                              │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Navigation    │   │ UI            │   │ Features      │
//! │ (navigation/) │   │ (ui/)         │   │ (features/)   │
//! │ - Router      │   │ - Views       │   │ - Feed, dogs  │
//! │ - Modal hist. │   │ - Overlays    │   │ - Messages    │
//! │ - History     │   │ - Toasts      │   │ - Health, ... │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                                                 │
//! ┌─────────────────────────────────────────────────────┐
//! │  API (api/) and Storage (storage/)                  │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/), Infrastructure, Observability    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Application context and event dispatch
//! - [`navigation`]: History trait, router, modal-history coordinator
//! - [`ui`]: Virtual UI tree, surface, views, overlays, toasts
//! - [`features`]: Feature services over the HTTP API
//! - [`api`]: Transport trait and the typed API client
//! - [`storage`]: Durable key-value storage and the session store
//! - [`domain`]: Error types and API records
//! - [`infrastructure`]: Filesystem locations
//! - [`observability`]: Rotating-file tracing setup
//!
//! # Configuration
//!
//! ```toml
//! # ~/.config/pawfeed/config.toml
//! api_base_url = "https://api.pawfeed.example.com"
//! app_base_url = "https://pawfeed.example.com"
//! request_timeout_secs = 10
//! poll_interval_secs = 30
//! trace_level = "pawfeed=debug"
//! ```
//!
//! Every key can be overridden with a `PAWFEED_<KEY>` environment variable.
//!
//! # Example
//!
//! ```
//! use pawfeed::api::{ApiRequest, ApiResponse, Transport};
//! use pawfeed::features::UnconfiguredIdentityProvider;
//! use pawfeed::navigation::MemoryHistory;
//! use pawfeed::storage::MemoryStore;
//! use pawfeed::{handle_event, App, Config, Event, Platform};
//! use std::sync::Arc;
//!
//! struct EmptyApi;
//!
//! #[async_trait::async_trait]
//! impl Transport for EmptyApi {
//!     async fn send(&self, _request: ApiRequest) -> pawfeed::Result<ApiResponse> {
//!         Ok(ApiResponse { status: 200, body: serde_json::json!({ "posts": [] }) })
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> pawfeed::Result<()> {
//! let platform = Platform {
//!     history: Arc::new(MemoryHistory::new("/")),
//!     store: Arc::new(MemoryStore::new()),
//!     transport: Arc::new(EmptyApi),
//!     identity: Arc::new(UnconfiguredIdentityProvider),
//! };
//! let mut app = App::new(&Config::default(), platform)?;
//!
//! handle_event(&mut app, &Event::Start).await?;
//! assert_eq!(app.current_view().await, Some("home"));
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod app;
pub mod domain;
pub mod features;
pub mod infrastructure;
pub mod navigation;
pub mod observability;
pub mod storage;
pub mod ui;

pub use app::{handle_event, App, Event, Platform};
pub use domain::{ErrorKind, PawfeedError, Result};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Prefix of environment variables that override config keys.
pub const ENV_PREFIX: &str = "PAWFEED_";

/// Client configuration.
///
/// Loaded from TOML, then overridden key by key from `PAWFEED_*` variables.
///
/// # Example
///
/// ```
/// use pawfeed::Config;
///
/// let config: Config = toml::from_str(r#"
///     api_base_url = "http://localhost:8080"
///     poll_interval_secs = 5
/// "#).unwrap();
///
/// assert_eq!(config.api_base_url, "http://localhost:8080");
/// assert_eq!(config.poll_interval_secs, 5);
/// assert_eq!(config.request_timeout_secs, 10);
/// assert!(!config.cart_enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the HTTP API.
    pub api_base_url: String,

    /// Public URL of the web app, used for share links.
    pub app_base_url: String,

    /// Client-side request deadline. Default: 10
    pub request_timeout_secs: u64,

    /// Unread-count polling period while signed in. Default: 30
    pub poll_interval_secs: u64,

    /// Directory for storage and logs. Default: `~/.local/share/pawfeed`
    pub data_dir: Option<String>,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`, or a full directive
    /// such as `pawfeed=debug`. Default: `"info"`
    pub trace_level: Option<String>,

    /// Enables the shop cart. Default: false
    pub cart_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            app_base_url: "http://localhost:5173".to_string(),
            request_timeout_secs: 10,
            poll_interval_secs: 30,
            data_dir: None,
            trace_level: None,
            cart_enabled: false,
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(PawfeedError::Config(format!("{key} must be a positive integer, got {value:?}"))),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(PawfeedError::Config(format!("{key} must be a boolean, got {value:?}"))),
    }
}

impl Config {
    /// Reads a TOML config file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = ?path, "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| PawfeedError::Config(format!("{}: {e}", path.display())))
    }

    /// Applies overrides from a key/value map (lower-case keys without prefix).
    ///
    /// Unknown keys are ignored; empty values clear optional settings.
    ///
    /// # Errors
    ///
    /// Returns [`PawfeedError::Config`] for values that do not parse.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use pawfeed::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("poll_interval_secs".to_string(), "5".to_string());
    /// map.insert("cart_enabled".to_string(), "true".to_string());
    ///
    /// let mut config = Config::default();
    /// config.apply_overrides(&map)?;
    /// assert_eq!(config.poll_interval_secs, 5);
    /// assert!(config.cart_enabled);
    /// # Ok::<(), pawfeed::PawfeedError>(())
    /// ```
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, String>) -> Result<()> {
        let optional = |value: &str| Some(value.trim().to_string()).filter(|v| !v.is_empty());

        for (key, value) in overrides {
            match key.as_str() {
                "api_base_url" => self.api_base_url = value.trim().to_string(),
                "app_base_url" => self.app_base_url = value.trim().to_string(),
                "request_timeout_secs" => self.request_timeout_secs = parse_number(key, value)?,
                "poll_interval_secs" => self.poll_interval_secs = parse_number(key, value)?,
                "data_dir" => self.data_dir = optional(value.as_str()),
                "trace_level" => self.trace_level = optional(value.as_str()),
                "cart_enabled" => self.cart_enabled = parse_bool(key, value)?,
                other => tracing::debug!(key = other, "ignoring unknown config override"),
            }
        }
        Ok(())
    }

    /// `PAWFEED_*` variables from the process environment as an override map.
    #[must_use]
    pub fn env_overrides() -> BTreeMap<String, String> {
        std::env::vars()
            .filter_map(|(key, value)| {
                key.strip_prefix(ENV_PREFIX)
                    .map(|name| (name.to_ascii_lowercase(), value))
            })
            .collect()
    }

    /// Loads `path` (if given and present) and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or an override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(&Self::env_overrides())?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`PawfeedError::Config`] if either base URL is not absolute, or
    /// if the request timeout or poll interval is zero. Values from a config
    /// file or a hand-built `Config` only meet this check, not the override
    /// parser.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [("api_base_url", &self.api_base_url), ("app_base_url", &self.app_base_url)] {
            url::Url::parse(value).map_err(|e| PawfeedError::Config(format!("{key} {value:?}: {e}")))?;
        }
        for (key, value) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("poll_interval_secs", self.poll_interval_secs),
        ] {
            if value == 0 {
                return Err(PawfeedError::Config(format!("{key} must be at least 1")));
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs)
    }
}

/// Builds the application for `config` and resolves the initial route.
///
/// # Errors
///
/// Returns configuration errors, or the initial route handler's error.
///
/// # Example
///
/// See the crate-level example.
pub async fn initialize(config: &Config, platform: Platform) -> Result<App> {
    tracing::debug!(api = %config.api_base_url, "initializing pawfeed client");
    let mut app = App::new(config, platform)?;
    handle_event(&mut app, &Event::Start).await?;
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_numbers_are_config_errors() {
        let mut map = BTreeMap::new();
        map.insert("request_timeout_secs".to_string(), "soon".to_string());
        let err = Config::default().apply_overrides(&map).unwrap_err();
        assert!(matches!(err, PawfeedError::Config(_)));

        map.insert("request_timeout_secs".to_string(), "0".to_string());
        assert!(Config::default().apply_overrides(&map).is_err());
    }

    #[test]
    fn empty_override_clears_optional_setting() {
        let mut config = Config {
            trace_level: Some("debug".to_string()),
            ..Config::default()
        };
        let mut map = BTreeMap::new();
        map.insert("trace_level".to_string(), " ".to_string());
        config.apply_overrides(&map).unwrap();
        assert_eq!(config.trace_level, None);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn zero_durations_fail_validation() {
        let config = Config {
            poll_interval_secs: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(PawfeedError::Config(msg)) if msg.contains("poll_interval_secs")));

        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(PawfeedError::Config(msg)) if msg.contains("request_timeout_secs")));
    }

    #[test]
    fn zero_interval_in_config_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "poll_interval_secs = 0\n").unwrap();

        assert!(Config::from_file(&path).is_ok());
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn relative_api_url_is_rejected() {
        let config = Config {
            api_base_url: "api.example.com".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}

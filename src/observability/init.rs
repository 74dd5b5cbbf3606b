//! Tracing initialization and subscriber setup.

use super::file_writer::FileWriter;
use crate::infrastructure::paths;
use crate::Config;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Resolves the filter directive: `RUST_LOG`, then `trace_level`, then `"info"`.
fn filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.trace_level.as_deref().unwrap_or("info");
        EnvFilter::try_new(level).unwrap_or_else(|e| {
            eprintln!("invalid trace_level {level:?} ({e}), using info");
            EnvFilter::new("info")
        })
    })
}

/// Initializes the tracing subscriber with a rotating log file.
///
/// Events are formatted as plain text into `pawfeed.log` inside `data_dir`.
///
/// # Initialization Behavior
///
/// - Creates the data directory if it doesn't exist
/// - Silently does nothing if directory creation fails (logging is optional)
/// - Idempotent: only the first call takes effect
///
/// # Example
///
/// ```no_run
/// use pawfeed::observability::init_tracing;
/// use pawfeed::Config;
/// use std::path::Path;
///
/// let config = Config {
///     trace_level: Some("pawfeed=debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config, Path::new("/tmp/pawfeed"));
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config, data_dir: &Path) {
    if std::fs::create_dir_all(data_dir).is_err() {
        return;
    }

    let writer = FileWriter::new(paths::log_file(data_dir));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer);

    let _ = tracing_subscriber::registry()
        .with(filter(config))
        .with(fmt_layer)
        .try_init();
}

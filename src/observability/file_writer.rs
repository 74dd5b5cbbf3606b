//! Size-rotated log file.
//!
//! The active file is `pawfeed.log`. Once it grows past [`MAX_LOG_BYTES`] it is
//! renamed to `pawfeed.log.<UTC timestamp>` and a fresh file is started. Only
//! the newest [`KEEP_BACKUPS`] backups survive.

use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing_subscriber::fmt::MakeWriter;

/// Rotation threshold (10 MB).
pub const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Rotated files kept next to the active one.
pub const KEEP_BACKUPS: usize = 3;

/// Sorts lexicographically in time order.
const BACKUP_STAMP: &str = "%Y%m%dT%H%M%S%.3f";

/// Writer handed to the `tracing-subscriber` fmt layer.
///
/// Each formatted event arrives as one `write` call; the size check runs
/// before every event, so a file never exceeds the threshold by more than one
/// record. The handle is opened lazily on the first event.
pub struct FileWriter {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileWriter {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: Mutex::new(None),
        }
    }

    fn handle(&self) -> MutexGuard<'_, Option<File>> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn append(&self, record: &[u8]) -> io::Result<()> {
        let mut handle = self.handle();

        if fs::metadata(&self.path).is_ok_and(|m| m.len() > MAX_LOG_BYTES) {
            *handle = None;
            self.rotate()?;
        }

        if handle.is_none() {
            *handle = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        }
        if let Some(file) = handle.as_mut() {
            file.write_all(record)?;
            file.flush()?;
        }
        Ok(())
    }

    fn rotate(&self) -> io::Result<()> {
        let backup = PathBuf::from(format!(
            "{}.{}",
            self.path.display(),
            Utc::now().format(BACKUP_STAMP)
        ));
        fs::rename(&self.path, backup)?;
        prune_backups(&self.path)
    }
}

/// Backups of `active`, oldest first.
fn backups(active: &Path) -> io::Result<Vec<PathBuf>> {
    let Some(dir) = active.parent() else {
        return Ok(Vec::new());
    };
    let Some(name) = active.file_name().and_then(|n| n.to_str()) else {
        return Ok(Vec::new());
    };
    let prefix = format!("{name}.");

    let mut found: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix))
        })
        .collect();
    found.sort();
    Ok(found)
}

/// Deletes all but the newest [`KEEP_BACKUPS`]. Failed deletions are skipped.
fn prune_backups(active: &Path) -> io::Result<()> {
    let found = backups(active)?;
    let excess = found.len().saturating_sub(KEEP_BACKUPS);
    for old in &found[..excess] {
        let _ = fs::remove_file(old);
    }
    Ok(())
}

impl Write for &FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.handle().as_mut().map_or(Ok(()), Write::flush)
    }
}

impl<'a> MakeWriter<'a> for FileWriter {
    type Writer = &'a FileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self
    }
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// src/audit/writer.rs

//! Rotating audit log writer.
//!
//! The writer keeps one file open together with a "next file at" deadline.
//! Before every write, if no file is open or the deadline has passed, the
//! current file is closed and `<dir>/<YYYYMMDD>-<HH>.log` is opened for
//! append (created if absent). The new deadline is `now + interval`.
//!
//! Logging is best effort: if the file cannot be opened the entry is dropped
//! and the caller carries on.
//!
//! Each entry is a pretty-printed JSON object (tab indent) followed by
//! `\r\n`. A file is therefore a concatenation of JSON values, not an array.

use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, TimeDelta};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{error, info, warn};

use crate::audit::clock::Clock;
use crate::fs::FileSystem;
use crate::types::{FileChangeLog, LogProgress, ProgressType};

const ENTRY_TERMINATOR: &[u8] = b"\r\n";

#[derive(Default)]
struct OpenLog {
    file: Option<Box<dyn Write + Send>>,
    path: Option<PathBuf>,
    next_file_at: Option<DateTime<Local>>,
}

/// Audit log writer shared by the store, the scan and the dispatcher.
///
/// All methods serialize on one lock, so a write and any rotation it
/// triggers never interleave with another write.
pub struct AuditLog {
    dir: PathBuf,
    interval: TimeDelta,
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    open: Mutex<OpenLog>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("dir", &self.dir)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl AuditLog {
    /// Create the writer and open the first file right away.
    ///
    /// The log directory is created if needed; failure to do so is only
    /// reported, writes will then be skipped until the file can be opened.
    pub fn new(
        dir: impl Into<PathBuf>,
        rotate_every_hours: u32,
        fs: Arc<dyn FileSystem>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let dir = dir.into();
        if let Err(err) = fs.create_dir_all(&dir) {
            warn!(dir = ?dir, error = %err, "could not create audit log directory");
        }

        let log = Self {
            dir,
            interval: TimeDelta::hours(i64::from(rotate_every_hours.max(1))),
            fs,
            clock,
            open: Mutex::new(OpenLog::default()),
        };
        {
            let mut open = log.lock();
            log.ensure_open(&mut open);
        }
        log
    }

    /// Path of the file currently receiving entries, if one is open.
    pub fn current_file(&self) -> Option<PathBuf> {
        self.lock().path.clone()
    }

    /// Record a change. Rotation may happen first.
    pub fn log_change(&self, entry: &FileChangeLog) {
        info!(
            change = %entry.change_type,
            path = %entry.file_path,
            "recording change"
        );
        self.write_entry(entry, "FileChangeLog object");
    }

    pub fn log_info(&self, info: &str, cause: Option<&dyn Display>) {
        self.write_progress(ProgressType::Info, info, cause);
    }

    /// Record an error and mirror it to the operator console.
    pub fn log_error(&self, info: &str, cause: &dyn Display) {
        self.write_progress(ProgressType::Error, info, Some(cause));
        error!("{info} {cause}");
    }

    fn write_progress(&self, kind: ProgressType, info: &str, cause: Option<&dyn Display>) {
        let progress = LogProgress {
            kind,
            info: info.to_string(),
            error: cause.map(|c| c.to_string()),
        };
        self.write_entry(&progress, "status");
    }

    fn lock(&self) -> MutexGuard<'_, OpenLog> {
        // A panic mid-write leaves nothing worth protecting; keep logging.
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entry<T: Serialize>(&self, entry: &T, what: &str) {
        let mut open = self.lock();
        if !self.ensure_open(&mut open) {
            return;
        }

        let bytes = match encode_entry(entry) {
            Ok(bytes) => bytes,
            Err(err) => format!("error marshaling {what} {err}\n").into_bytes(),
        };

        if let Some(file) = open.file.as_mut() {
            if let Err(err) = file.write_all(&bytes).and_then(|_| file.flush()) {
                warn!(path = ?open.path, error = %err, "failed to write audit log entry");
            }
        }
    }

    /// Make sure a file valid for "now" is open. Returns false if none could
    /// be opened.
    fn ensure_open(&self, open: &mut OpenLog) -> bool {
        let now = self.clock.now();
        let still_valid = open.next_file_at.is_some_and(|deadline| now < deadline);
        if open.file.is_some() && still_valid {
            return true;
        }

        // Dropping the handle closes the previous file.
        open.file = None;

        let path = log_file_name(&self.dir, now);
        match self.fs.open_append(&path) {
            Ok(file) => {
                open.file = Some(file);
                open.path = Some(path);
                open.next_file_at = Some(now + self.interval);
                true
            }
            Err(err) => {
                warn!(path = ?path, error = %err, "error opening log file");
                open.path = None;
                false
            }
        }
    }
}

/// `<dir>/<YYYYMMDD>-<HH>.log` for the given local time.
pub fn log_file_name(dir: &Path, at: DateTime<Local>) -> PathBuf {
    dir.join(at.format("%Y%m%d-%H.log").to_string())
}

/// Encode one entry: tab-indented JSON terminated by CRLF.
pub fn encode_entry<T: Serialize>(entry: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    entry.serialize(&mut ser)?;
    buf.extend_from_slice(ENTRY_TERMINATOR);
    Ok(buf)
}

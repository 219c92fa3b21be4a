// src/engine/mod.rs

//! Event dispatching for folderwatch.
//!
//! This module ties together:
//! - the change events produced by the watcher (or synthesized by the scan)
//! - the pure routing of an operation to a store action ([`dispatcher`])
//! - the one-time initial inventory of the watched directory ([`scan`])
//! - the worker pool that applies events in per-path order ([`pool`])
//! - the loop draining the shared event channel into the pool ([`runtime`])

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::fs::FileSnapshot;

/// Filesystem operation reported for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    /// Content written.
    Write,
    /// Permission or mode bits changed.
    Chmod,
    Remove,
    /// Moved to another directory.
    Move,
    /// Renamed within the same directory.
    Rename,
}

/// A normalized change notification for a single file.
///
/// `mode`, `size` and `modified` are a snapshot taken when the change was
/// observed; they may already be stale when the event is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub op: Operation,
    pub path: PathBuf,
    pub name: String,
    pub mode: String,
    pub size: i64,
    pub modified: DateTime<Local>,
}

impl ChangeEvent {
    pub fn from_snapshot(op: Operation, path: impl Into<PathBuf>, snapshot: &FileSnapshot) -> Self {
        let path = path.into();
        Self {
            op,
            name: file_name_of(&path),
            path,
            mode: snapshot.mode.clone(),
            size: snapshot.size,
            modified: snapshot.modified,
        }
    }

    /// Event for a path whose metadata is no longer available (e.g. removed).
    pub fn without_metadata(op: Operation, path: impl Into<PathBuf>, observed_at: DateTime<Local>) -> Self {
        let path = path.into();
        Self {
            op,
            name: file_name_of(&path),
            path,
            mode: String::new(),
            size: 0,
            modified: observed_at,
        }
    }

    /// Store key for this event.
    pub fn path_key(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub mod dispatcher;
pub mod pool;
pub mod runtime;
pub mod scan;

pub use dispatcher::{route, DispatchOutcome, Dispatcher, EventHandler, StoreAction};
pub use pool::{worker_for, DispatchPool};
pub use runtime::Runtime;
pub use scan::{initial_scan, ScanSummary};

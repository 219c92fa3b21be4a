#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use tempfile::TempDir;

use folderwatch::audit::{AuditLog, ManualClock};
use folderwatch::engine::{ChangeEvent, Operation};
use folderwatch::fs::{FileSystem, RealFileSystem};
use folderwatch::store::ChangeStore;
use folderwatch::types::DeleteFailurePolicy;

/// Fixed start time for tests that look at log file names.
pub fn start_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 4, 1, 9, 30, 0).single().unwrap()
}

/// A temporary target directory plus a store and audit log outside of it.
pub struct Harness {
    pub _tmp: TempDir,
    pub target: PathBuf,
    pub log_dir: PathBuf,
    pub db_path: PathBuf,
    pub fs: Arc<dyn FileSystem>,
    pub clock: Arc<ManualClock>,
    pub audit: Arc<AuditLog>,
    pub store: Arc<ChangeStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(DeleteFailurePolicy::Report)
    }

    pub fn with_policy(policy: DeleteFailurePolicy) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().canonicalize().unwrap();
        let target = base.join("watched");
        std::fs::create_dir_all(&target).unwrap();
        let log_dir = base.join("logs");
        let db_path = base.join("folderwatch.db");

        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let clock = Arc::new(ManualClock::new(start_time()));
        let audit = Arc::new(AuditLog::new(&log_dir, 1, Arc::clone(&fs), clock.clone()));
        let store = Arc::new(ChangeStore::open(&db_path, Arc::clone(&audit), policy).unwrap());

        Self {
            _tmp: tmp,
            target,
            log_dir,
            db_path,
            fs,
            clock,
            audit,
            store,
        }
    }

    pub fn write_file(&self, name: &str, size: usize) -> PathBuf {
        let path = self.target.join(name);
        std::fs::write(&path, vec![b'x'; size]).unwrap();
        path
    }

    /// Event for `name` with metadata read from disk.
    pub fn event(&self, op: Operation, name: &str) -> ChangeEvent {
        let path = self.target.join(name);
        let snapshot = self.fs.metadata(&path).unwrap();
        ChangeEvent::from_snapshot(op, path, &snapshot)
    }

    /// Event for a path that no longer exists.
    pub fn gone(&self, op: Operation, name: &str) -> ChangeEvent {
        ChangeEvent::without_metadata(op, self.target.join(name), Local::now())
    }

    pub fn key(&self, name: &str) -> String {
        self.target.join(name).to_string_lossy().into_owned()
    }

    pub fn current_log(&self) -> PathBuf {
        self.audit.current_file().unwrap()
    }
}

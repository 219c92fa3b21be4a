// src/engine/scan.rs

//! One-time inventory of the watched directory at startup.

use std::path::Path;

use tracing::debug;

use crate::audit::AuditLog;
use crate::errors::{FolderwatchError, Result};
use crate::fs::FileSystem;
use crate::store::{ChangeRecord, ChangeStore};
use crate::watch::PathFilter;

/// Counts from an initial scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Entries listed in the directory.
    pub entries: usize,
    /// Regular files recorded as `Initial`.
    pub recorded: usize,
    /// Directories, special files and excluded paths.
    pub skipped: usize,
    /// Regular files whose metadata could not be read.
    pub failed: usize,
}

/// Record every regular file directly inside `dir` (no recursion).
///
/// - A directory that cannot be listed is logged and returned as an error.
/// - A file whose metadata cannot be read is logged and skipped.
/// - Any store error aborts the scan and is returned.
pub fn initial_scan(
    fs: &dyn FileSystem,
    dir: &Path,
    filter: &PathFilter,
    store: &ChangeStore,
    audit: &AuditLog,
) -> Result<ScanSummary> {
    let entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            audit.log_error("error reading target directory", &format!("{err:#}"));
            return Err(FolderwatchError::Other(err));
        }
    };

    println!("[folderwatch] adding {} entries to database", entries.len());

    let mut summary = ScanSummary {
        entries: entries.len(),
        ..ScanSummary::default()
    };

    for entry in entries {
        if !entry.kind.is_regular() || filter.is_excluded(&entry.path) {
            debug!(path = ?entry.path, kind = ?entry.kind, "skipping entry");
            summary.skipped += 1;
            continue;
        }

        let snapshot = match fs.metadata(&entry.path) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                audit.log_error(
                    &format!("Error retrieving info for {}", entry.name),
                    &format!("{err:#}"),
                );
                summary.failed += 1;
                continue;
            }
        };

        let record = ChangeRecord {
            file_path: dir.join(&entry.name).to_string_lossy().into_owned(),
            file_name: entry.name,
            mode: snapshot.mode,
            size: snapshot.size,
        };
        store.insert_initial(&record, snapshot.modified)?;
        summary.recorded += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Local, TimeZone};

    use super::*;
    use crate::audit::ManualClock;
    use crate::fs::mock::MockFileSystem;
    use crate::fs::EntryKind;
    use crate::types::DeleteFailurePolicy;

    fn setup() -> (MockFileSystem, Arc<AuditLog>, ChangeStore) {
        let fs = MockFileSystem::new();
        let clock = ManualClock::new(Local.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).single().unwrap());
        let audit = Arc::new(AuditLog::new("/logs", 1, Arc::new(fs.clone()), Arc::new(clock)));
        let store = ChangeStore::open_in_memory(audit.clone(), DeleteFailurePolicy::Report).unwrap();
        (fs, audit, store)
    }

    #[test]
    fn records_only_regular_files() {
        let (fs, audit, store) = setup();
        fs.add_file("/w/a.txt", 500);
        fs.add_file_with_mode("/w/b.txt", 10, 0o600);
        fs.add_file("/w/sub/nested.txt", 7);
        fs.add_special("/w/link", EntryKind::Symlink);
        fs.add_special("/w/pipe", EntryKind::Fifo);

        let filter = PathFilter::new("/w", &[]).unwrap();
        let summary = initial_scan(&fs, Path::new("/w"), &filter, &store, &audit).unwrap();

        assert_eq!(
            summary,
            ScanSummary { entries: 5, recorded: 2, skipped: 3, failed: 0 }
        );
        let records = store.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file_name, "a.txt");
        assert_eq!(records[0].size, 500);
        assert_eq!(records[0].mode, "-rw-r--r--");
        assert_eq!(records[1].file_path, "/w/b.txt");
        assert_eq!(records[1].mode, "-rw-------");
    }

    #[test]
    fn unreadable_file_is_skipped_not_fatal() {
        let (fs, audit, store) = setup();
        fs.add_file("/w/ok.txt", 1);
        fs.add_unreadable_file("/w/locked.txt");

        let filter = PathFilter::new("/w", &[]).unwrap();
        let summary = initial_scan(&fs, Path::new("/w"), &filter, &store, &audit).unwrap();

        assert_eq!(summary.recorded, 1);
        assert_eq!(summary.failed, 1);
        assert!(fs.appended("/logs/20260105-08.log").contains("Error retrieving info for locked.txt"));
    }

    #[test]
    fn missing_directory_is_fatal() {
        let (fs, audit, store) = setup();
        let filter = PathFilter::new("/nowhere", &[]).unwrap();

        let result = initial_scan(&fs, Path::new("/nowhere"), &filter, &store, &audit);
        assert!(result.is_err());
        assert!(fs.appended("/logs/20260105-08.log").contains("error reading target directory"));
    }

    #[test]
    fn excluded_files_are_not_recorded() {
        let (fs, audit, store) = setup();
        fs.add_file("/w/keep.txt", 1);
        fs.add_file("/w/scratch.tmp", 1);

        let filter = PathFilter::new("/w", &["*.tmp".to_string()]).unwrap();
        initial_scan(&fs, Path::new("/w"), &filter, &store, &audit).unwrap();

        assert!(store.get("/w/keep.txt").unwrap().is_some());
        assert!(store.get("/w/scratch.tmp").unwrap().is_none());
    }

    #[test]
    fn unusable_store_aborts_at_the_first_file() {
        let (fs, audit, store) = setup();
        fs.add_file("/w/a.txt", 5);
        fs.add_file("/w/b.txt", 6);
        store.execute_batch("DROP TABLE fsevents;").unwrap();

        let filter = PathFilter::new("/w", &[]).unwrap();
        let err = initial_scan(&fs, Path::new("/w"), &filter, &store, &audit).unwrap_err();

        assert!(err.is_fatal());
        assert!(
            matches!(
                err,
                FolderwatchError::Preparation { statement: "add initial record", .. }
            ),
            "{err:?}"
        );

        // a.txt was attempted and failed; b.txt was never reached.
        let log = fs.appended("/logs/20260105-08.log");
        assert!(log.contains("\"file_path\": \"/w/a.txt\""));
        assert!(!log.contains("/w/b.txt"));
        assert!(log.contains("error preparing the add initial record statement:"));
    }
}

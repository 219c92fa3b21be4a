// tests/initial_scan.rs

mod common;

use common::Harness;
use folderwatch::engine::initial_scan;
use folderwatch::watch::PathFilter;
use folderwatch_test_utils::{change_entries, init_tracing, read_log_entries};

#[test]
fn scan_records_regular_files_only() {
    init_tracing();
    let h = Harness::new();
    h.write_file("a.txt", 500);
    h.write_file("b.txt", 10);
    std::fs::create_dir(h.target.join("subdir")).unwrap();
    std::fs::write(h.target.join("subdir/nested.txt"), b"nested").unwrap();
    #[cfg(unix)]
    std::os::unix::fs::symlink(h.target.join("a.txt"), h.target.join("link")).unwrap();

    let filter = PathFilter::new(&h.target, &[]).unwrap();
    let summary = initial_scan(h.fs.as_ref(), &h.target, &filter, &h.store, &h.audit).unwrap();

    assert_eq!(summary.recorded, 2);
    assert_eq!(summary.failed, 0);

    let records = h.store.records().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].file_path, h.key("a.txt"));
    assert_eq!(records[0].file_name, "a.txt");
    assert_eq!(records[0].size, 500);
    assert_eq!(records[1].file_path, h.key("b.txt"));
    assert_eq!(records[1].size, 10);
    assert!(records.iter().all(|r| r.mode.starts_with('-')));

    let entries = read_log_entries(h.current_log()).unwrap();
    assert_eq!(
        change_entries(&entries),
        vec![
            ("Initial".to_string(), h.key("a.txt")),
            ("Initial".to_string(), h.key("b.txt")),
        ]
    );
}

#[test]
fn empty_directory_records_nothing() {
    let h = Harness::new();
    let filter = PathFilter::new(&h.target, &[]).unwrap();

    let summary = initial_scan(h.fs.as_ref(), &h.target, &filter, &h.store, &h.audit).unwrap();

    assert_eq!(summary.entries, 0);
    assert!(h.store.is_empty().unwrap());
}

#[test]
fn missing_target_is_an_error_and_logged() {
    let h = Harness::new();
    let missing = h.target.join("does-not-exist");
    let filter = PathFilter::new(&missing, &[]).unwrap();

    let result = initial_scan(h.fs.as_ref(), &missing, &filter, &h.store, &h.audit);
    assert!(result.is_err());

    let entries = read_log_entries(h.current_log()).unwrap();
    let last = entries.last().unwrap();
    assert_eq!(last["type"], "error");
    assert_eq!(last["info"], "error reading target directory");
}

#[test]
fn store_starts_empty_on_reopen() {
    let h = Harness::new();
    h.write_file("a.txt", 1);
    let filter = PathFilter::new(&h.target, &[]).unwrap();
    initial_scan(h.fs.as_ref(), &h.target, &filter, &h.store, &h.audit).unwrap();
    assert_eq!(h.store.len().unwrap(), 1);

    let reopened = folderwatch::store::ChangeStore::open(
        &h.db_path,
        h.audit.clone(),
        Default::default(),
    )
    .unwrap();
    assert!(reopened.is_empty().unwrap());

    let entries = read_log_entries(h.current_log()).unwrap();
    assert!(entries
        .iter()
        .any(|e| e["info"] == "1 rows deleted from 'fsevents' table"));
}


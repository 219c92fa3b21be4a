// tests/log_rotation.rs

mod common;

use std::sync::Arc;

use chrono::TimeDelta;

use common::start_time;
use folderwatch::audit::{log_file_name, AuditLog, ManualClock};
use folderwatch::fs::RealFileSystem;
use folderwatch::types::{FileChangeLog, ProgressType};
use folderwatch_test_utils::read_log_entries;

fn change(path: &str) -> FileChangeLog {
    FileChangeLog {
        change_type: "Add".into(),
        file_path: path.into(),
        mode: "-rw-r--r--".into(),
        size: 3,
        last_updated: start_time(),
    }
}

#[test]
fn log_directory_is_created_and_first_file_opened() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("nested/logs");
    let clock = Arc::new(ManualClock::new(start_time()));

    let log = AuditLog::new(&dir, 1, Arc::new(RealFileSystem), clock);

    let expected = log_file_name(&dir, start_time());
    assert_eq!(log.current_file(), Some(expected.clone()));
    assert!(expected.exists());
}

#[test]
fn rotation_follows_the_interval() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("logs");
    let clock = Arc::new(ManualClock::new(start_time()));
    let log = AuditLog::new(&dir, 2, Arc::new(RealFileSystem), clock.clone());

    log.log_change(&change("/w/first"));
    clock.advance(TimeDelta::minutes(119));
    log.log_change(&change("/w/second"));
    clock.advance(TimeDelta::minutes(2));
    log.log_change(&change("/w/third"));

    let first_file = log_file_name(&dir, start_time());
    let second_file = log_file_name(&dir, start_time() + TimeDelta::minutes(121));
    assert_ne!(first_file, second_file);

    let first = read_log_entries(&first_file).unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[1]["file_path"], "/w/second");

    let second = read_log_entries(&second_file).unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0]["file_path"], "/w/third");
}

#[test]
fn entries_use_the_documented_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(start_time()));
    let log = AuditLog::new(tmp.path(), 1, Arc::new(RealFileSystem), clock);

    log.log_change(&change("/w/a.txt"));
    log.log_error("error adding the record for /w/a.txt", &"UNIQUE constraint failed");

    let path = log.current_file().unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\n\t\"change_type\": \"Add\",\n"));
    assert!(raw.ends_with("}\r\n"));
    assert_eq!(raw.matches("}\r\n").count(), 2);

    let entries = read_log_entries(&path).unwrap();
    let change: FileChangeLog = serde_json::from_value(entries[0].clone()).unwrap();
    assert_eq!(change.size, 3);
    assert_eq!(entries[1]["type"], serde_json::to_value(ProgressType::Error).unwrap());
    assert_eq!(entries[1]["error"], "UNIQUE constraint failed");
}

#[test]
fn appends_to_an_existing_file_for_the_same_hour() {
    let tmp = tempfile::tempdir().unwrap();
    let fs = Arc::new(RealFileSystem);

    let first = AuditLog::new(tmp.path(), 1, fs.clone(), Arc::new(ManualClock::new(start_time())));
    first.log_change(&change("/w/one"));
    drop(first);

    let second = AuditLog::new(tmp.path(), 1, fs, Arc::new(ManualClock::new(start_time())));
    second.log_change(&change("/w/two"));

    let entries = read_log_entries(second.current_file().unwrap()).unwrap();
    assert_eq!(entries.len(), 2);
}

// src/watch/normalize.rs

//! Turning raw `notify` events into [`ChangeEvent`]s.

use std::path::Path;

use chrono::{DateTime, Local};
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use tracing::{debug, trace};

use crate::engine::{ChangeEvent, Operation};
use crate::fs::{EntryKind, FileSystem};

/// Map a notify event kind onto an [`Operation`].
///
/// Access events, folder-level create/remove and unknown kinds yield `None`.
/// A two-path rename is a `Rename` when both paths share a parent and a
/// `Move` otherwise.
pub fn classify(kind: &EventKind, paths: &[std::path::PathBuf]) -> Option<Operation> {
    match kind {
        EventKind::Create(CreateKind::Folder) => None,
        EventKind::Create(_) => Some(Operation::Create),
        EventKind::Modify(ModifyKind::Metadata(_)) => Some(Operation::Chmod),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match paths {
            [from, to] if from.parent() != to.parent() => Some(Operation::Move),
            _ => Some(Operation::Rename),
        },
        EventKind::Modify(ModifyKind::Name(_)) => Some(Operation::Rename),
        EventKind::Modify(_) => Some(Operation::Write),
        EventKind::Remove(RemoveKind::Folder) => None,
        EventKind::Remove(_) => Some(Operation::Remove),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

/// Normalize one notify event into zero or more change events.
///
/// Create, write and chmod events need a metadata snapshot: paths that are
/// directories or have already vanished are dropped. Removals, moves and
/// renames carry no metadata and are stamped with `observed_at`.
pub fn normalize(
    fs: &dyn FileSystem,
    root: &Path,
    event: &Event,
    observed_at: DateTime<Local>,
) -> Vec<ChangeEvent> {
    let Some(op) = classify(&event.kind, &event.paths) else {
        trace!(kind = ?event.kind, "ignoring notify event");
        return Vec::new();
    };

    let mut out = Vec::with_capacity(event.paths.len());
    for path in &event.paths {
        if path == root {
            continue;
        }

        match op {
            Operation::Remove | Operation::Move | Operation::Rename => {
                out.push(ChangeEvent::without_metadata(op, path.clone(), observed_at));
            }
            Operation::Create | Operation::Write | Operation::Chmod => match fs.metadata(path) {
                Ok(snapshot) if snapshot.kind == EntryKind::Dir => {
                    trace!(path = ?path, "ignoring directory event");
                }
                Ok(snapshot) => out.push(ChangeEvent::from_snapshot(op, path.clone(), &snapshot)),
                Err(err) => {
                    debug!(path = ?path, error = %err, "metadata unavailable; dropping event");
                }
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;
    use notify::event::{DataChange, MetadataKind};

    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 2, 2, 2, 2, 2).single().unwrap()
    }

    #[test]
    fn kinds_map_to_operations() {
        let one = [PathBuf::from("/w/a")];
        let cases = [
            (EventKind::Create(CreateKind::File), Some(Operation::Create)),
            (EventKind::Modify(ModifyKind::Data(DataChange::Content)), Some(Operation::Write)),
            (EventKind::Modify(ModifyKind::Any), Some(Operation::Write)),
            (EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)), Some(Operation::Chmod)),
            (EventKind::Modify(ModifyKind::Name(RenameMode::From)), Some(Operation::Rename)),
            (EventKind::Remove(RemoveKind::File), Some(Operation::Remove)),
            (EventKind::Remove(RemoveKind::Folder), None),
            (EventKind::Create(CreateKind::Folder), None),
            (EventKind::Any, None),
        ];
        for (kind, expected) in cases {
            assert_eq!(classify(&kind, &one), expected, "{kind:?}");
        }
    }

    #[test]
    fn rename_across_directories_is_a_move() {
        let kind = EventKind::Modify(ModifyKind::Name(RenameMode::Both));
        let same = [PathBuf::from("/w/a"), PathBuf::from("/w/b")];
        let across = [PathBuf::from("/w/a"), PathBuf::from("/w/sub/a")];
        assert_eq!(classify(&kind, &same), Some(Operation::Rename));
        assert_eq!(classify(&kind, &across), Some(Operation::Move));
    }

    #[test]
    fn create_carries_a_snapshot() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/c.txt", 0);
        let event = Event::new(EventKind::Create(CreateKind::File)).add_path("/w/c.txt".into());

        let changes = normalize(&fs, Path::new("/w"), &event, now());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].op, Operation::Create);
        assert_eq!(changes[0].name, "c.txt");
        assert_eq!(changes[0].mode, "-rw-r--r--");
        assert_eq!(changes[0].size, 0);
    }

    #[test]
    fn remove_has_no_metadata() {
        let fs = MockFileSystem::new();
        let event = Event::new(EventKind::Remove(RemoveKind::File)).add_path("/w/b.txt".into());

        let changes = normalize(&fs, Path::new("/w"), &event, now());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].mode, "");
        assert_eq!(changes[0].size, 0);
        assert_eq!(changes[0].modified, now());
    }

    #[test]
    fn directories_and_vanished_files_are_dropped() {
        let fs = MockFileSystem::new();
        fs.add_dir("/w/sub");
        let event = Event::new(EventKind::Create(CreateKind::Any))
            .add_path("/w/sub".into())
            .add_path("/w/gone.txt".into());

        assert!(normalize(&fs, Path::new("/w"), &event, now()).is_empty());
    }
}

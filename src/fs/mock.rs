// src/fs/mock.rs

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, TimeZone};

use super::{mode_string, DirEntry, EntryKind, FileSnapshot, FileSystem};

#[derive(Debug, Clone)]
struct MockEntry {
    kind: EntryKind,
    bits: u32,
    size: i64,
    modified: DateTime<Local>,
    /// Listed by `read_dir`, but `metadata` fails.
    unreadable: bool,
}

#[derive(Debug, Default)]
struct MockState {
    entries: BTreeMap<PathBuf, MockEntry>,
    appended: BTreeMap<PathBuf, Arc<Mutex<Vec<u8>>>>,
}

/// In-memory filesystem for tests.
///
/// Entries are keyed by full path; a directory's listing is every entry whose
/// parent is that directory. Files opened with `open_append` are captured in
/// memory and can be read back with [`MockFileSystem::appended`].
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
    fail_appends: Arc<AtomicBool>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut state = self.state();
        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() {
                break;
            }
            state
                .entries
                .entry(dir.to_path_buf())
                .or_insert_with(|| default_entry(EntryKind::Dir, 0o755, 4096));
            parent = dir.parent();
        }
        state.entries.insert(path.to_path_buf(), entry);
    }

    /// Add a regular `0644` file of `size` bytes.
    pub fn add_file(&self, path: impl AsRef<Path>, size: i64) {
        self.add_file_with_mode(path, size, 0o644);
    }

    pub fn add_file_with_mode(&self, path: impl AsRef<Path>, size: i64, bits: u32) {
        self.insert(path.as_ref(), default_entry(EntryKind::File, bits, size));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), default_entry(EntryKind::Dir, 0o755, 4096));
    }

    /// Add a non-regular, non-directory entry (symlink, device, fifo...).
    pub fn add_special(&self, path: impl AsRef<Path>, kind: EntryKind) {
        self.insert(path.as_ref(), default_entry(kind, 0o777, 0));
    }

    /// Add a regular file whose metadata cannot be read.
    pub fn add_unreadable_file(&self, path: impl AsRef<Path>) {
        let mut entry = default_entry(EntryKind::File, 0o644, 0);
        entry.unreadable = true;
        self.insert(path.as_ref(), entry);
    }

    /// Make every subsequent `open_append` fail (or succeed again).
    pub fn set_append_failure(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Everything written through `open_append` to `path`.
    pub fn appended(&self, path: impl AsRef<Path>) -> String {
        let state = self.state();
        state
            .appended
            .get(path.as_ref())
            .map(|buf| {
                let bytes = buf.lock().unwrap_or_else(PoisonError::into_inner);
                String::from_utf8_lossy(&bytes).into_owned()
            })
            .unwrap_or_default()
    }

    /// Paths that were opened for append, in sorted order.
    pub fn appended_paths(&self) -> Vec<PathBuf> {
        self.state().appended.keys().cloned().collect()
    }
}

fn default_entry(kind: EntryKind, bits: u32, size: i64) -> MockEntry {
    MockEntry {
        kind,
        bits,
        size,
        modified: Local
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .unwrap_or_else(Local::now),
        unreadable: false,
    }
}

struct MockAppender(Arc<Mutex<Vec<u8>>>);

impl Write for MockAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FileSystem for MockFileSystem {
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let state = self.state();
        match state.entries.get(path) {
            Some(entry) if entry.kind == EntryKind::Dir => {}
            _ => return Err(anyhow!("Not a directory or not found: {:?}", path)),
        }

        Ok(state
            .entries
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .map(|(p, entry)| DirEntry {
                path: p.clone(),
                name: p
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                kind: entry.kind,
            })
            .collect())
    }

    fn metadata(&self, path: &Path) -> Result<FileSnapshot> {
        let state = self.state();
        match state.entries.get(path) {
            Some(entry) if entry.unreadable => Err(anyhow!("Permission denied: {:?}", path)),
            Some(entry) => Ok(FileSnapshot {
                kind: entry.kind,
                mode: mode_string(entry.kind, entry.bits),
                size: entry.size,
                modified: entry.modified,
            }),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn open_append(&self, path: &Path) -> Result<Box<dyn Write + Send>> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(anyhow!("Read-only file system: {:?}", path));
        }
        let mut state = self.state();
        let buf = state
            .appended
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())));
        Ok(Box::new(MockAppender(Arc::clone(buf))))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.add_dir(path);
        Ok(())
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // Tests use absolute paths throughout.
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_returns_direct_children_only() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/a.txt", 500);
        fs.add_file("/w/sub/deep.txt", 1);
        fs.add_special("/w/link", EntryKind::Symlink);

        let names: Vec<String> = fs
            .read_dir(Path::new("/w"))
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a.txt", "link", "sub"]);
    }

    #[test]
    fn appended_bytes_are_captured() {
        let fs = MockFileSystem::new();
        let mut w = fs.open_append(Path::new("/logs/x.log")).unwrap();
        w.write_all(b"hello").unwrap();
        let mut w = fs.open_append(Path::new("/logs/x.log")).unwrap();
        w.write_all(b" world").unwrap();
        assert_eq!(fs.appended("/logs/x.log"), "hello world");
    }
}

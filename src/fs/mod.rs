// src/fs/mod.rs

//! Filesystem access used by the initial scan, event normalization and the
//! audit log. Production code uses [`RealFileSystem`]; tests use
//! [`mock::MockFileSystem`].

use std::fmt::Debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

pub mod mock;
pub mod mode;

pub use mode::mode_string;

/// Type of a directory entry, taken from the entry itself (symlinks are not
/// followed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    BlockDevice,
    CharDevice,
    Fifo,
    Socket,
    Unknown,
}

impl EntryKind {
    pub fn is_regular(&self) -> bool {
        matches!(self, EntryKind::File)
    }

    pub fn from_file_type(ft: fs::FileType) -> Self {
        if ft.is_symlink() {
            return EntryKind::Symlink;
        }
        if ft.is_dir() {
            return EntryKind::Dir;
        }
        if ft.is_file() {
            return EntryKind::File;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if ft.is_block_device() {
                return EntryKind::BlockDevice;
            }
            if ft.is_char_device() {
                return EntryKind::CharDevice;
            }
            if ft.is_fifo() {
                return EntryKind::Fifo;
            }
            if ft.is_socket() {
                return EntryKind::Socket;
            }
        }
        EntryKind::Unknown
    }
}

/// A single entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
}

/// Metadata of a file at the moment it was observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    pub kind: EntryKind,
    /// `ls -l` style permission string, e.g. `-rw-r--r--`.
    pub mode: String,
    pub size: i64,
    pub modified: DateTime<Local>,
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Direct entries of `path` (non-recursive).
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Metadata of `path` without following a final symlink.
    fn metadata(&self, path: &Path) -> Result<FileSnapshot>;

    /// Open `path` for appending, creating it if absent.
    fn open_append(&self, path: &Path) -> Result<Box<dyn Write + Send>>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry.with_context(|| format!("reading entry of {:?}", path))?;
            let kind = entry
                .file_type()
                .map(EntryKind::from_file_type)
                .unwrap_or(EntryKind::Unknown);
            entries.push(DirEntry {
                path: entry.path(),
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn metadata(&self, path: &Path) -> Result<FileSnapshot> {
        let meta = fs::symlink_metadata(path)
            .with_context(|| format!("reading metadata of {:?}", path))?;
        Ok(mode::snapshot_from_metadata(&meta))
    }

    fn open_append(&self, path: &Path) -> Result<Box<dyn Write + Send>> {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening {:?} for append", path))?;
        Ok(Box::new(file))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("creating dir {:?}", path))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("canonicalizing {:?}", path))
    }
}

// src/fs/mode.rs

//! Rendering of file type and permission bits as a ten-ish character string.

use std::fs::Metadata;

use chrono::{DateTime, Local};

use super::{EntryKind, FileSnapshot};

const SETUID: u32 = 0o4000;
const SETGID: u32 = 0o2000;
const STICKY: u32 = 0o1000;

/// Render `kind` and the unix mode `bits` like `-rw-r--r--`.
///
/// Type letters come first in the order `d L D p S u g c t`; a plain file
/// with no special bits gets a single `-`. Character devices carry both `D`
/// and `c`.
pub fn mode_string(kind: EntryKind, bits: u32) -> String {
    let mut out = String::with_capacity(12);

    match kind {
        EntryKind::Dir => out.push('d'),
        EntryKind::Symlink => out.push('L'),
        EntryKind::BlockDevice | EntryKind::CharDevice => out.push('D'),
        EntryKind::Fifo => out.push('p'),
        EntryKind::Socket => out.push('S'),
        EntryKind::File | EntryKind::Unknown => {}
    }
    if bits & SETUID != 0 {
        out.push('u');
    }
    if bits & SETGID != 0 {
        out.push('g');
    }
    if kind == EntryKind::CharDevice {
        out.push('c');
    }
    if bits & STICKY != 0 {
        out.push('t');
    }
    if out.is_empty() {
        out.push('-');
    }

    for (i, ch) in "rwxrwxrwx".chars().enumerate() {
        if bits & (1 << (8 - i)) != 0 {
            out.push(ch);
        } else {
            out.push('-');
        }
    }
    out
}

#[cfg(unix)]
fn permission_bits(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(meta: &Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}

pub(crate) fn snapshot_from_metadata(meta: &Metadata) -> FileSnapshot {
    let kind = EntryKind::from_file_type(meta.file_type());
    let modified = meta
        .modified()
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now());

    FileSnapshot {
        kind,
        mode: mode_string(kind, permission_bits(meta)),
        size: i64::try_from(meta.len()).unwrap_or(i64::MAX),
        modified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_files_and_directories() {
        assert_eq!(mode_string(EntryKind::File, 0o644), "-rw-r--r--");
        assert_eq!(mode_string(EntryKind::Dir, 0o755), "drwxr-xr-x");
        assert_eq!(mode_string(EntryKind::File, 0), "----------");
    }

    #[test]
    fn special_bits_become_prefix_letters() {
        assert_eq!(mode_string(EntryKind::Symlink, 0o777), "Lrwxrwxrwx");
        assert_eq!(mode_string(EntryKind::File, 0o4755), "urwxr-xr-x");
        assert_eq!(mode_string(EntryKind::Dir, 0o1777), "dtrwxrwxrwx");
        assert_eq!(mode_string(EntryKind::CharDevice, 0o620), "Dcrw--w----");
        assert_eq!(mode_string(EntryKind::Fifo, 0o600), "prw-------");
    }
}

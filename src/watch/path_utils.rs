// src/watch/path_utils.rs

//! Path helpers shared by the watcher and the exclude filter.

use std::path::{Path, PathBuf};

/// `path` relative to `root`, with forward slashes.
///
/// Tries a plain `strip_prefix` first. If that fails (symlinked roots, or
/// `/private/var` vs `/var` on macOS) both sides are resolved and compared
/// again. Returns `None` if `path` is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = resolve_lenient(path);
    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}

/// Best-effort absolute, canonical form of `path`.
///
/// A path that does not exist (yet, or any more) is resolved through its
/// parent directory; failing that it is made absolute against the working
/// directory.
pub fn resolve_lenient(path: &Path) -> PathBuf {
    if let Ok(canon) = path.canonicalize() {
        return canon;
    }
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if let Ok(parent) = parent.canonicalize() {
            return parent.join(name);
        }
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn to_slash(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

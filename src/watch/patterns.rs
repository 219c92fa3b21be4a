// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::watch::path_utils::{relative_str, resolve_lenient};

/// SQLite writes these next to the database file.
const STORE_SIDE_FILES: [&str; 3] = ["-journal", "-wal", "-shm"];

/// Decides which paths are left out of tracking.
///
/// A path is excluded when any of the following holds:
/// - it is one of the explicitly excluded files (the store and its side files);
/// - it lies under an excluded directory (the audit log directory);
/// - its path relative to the root matches one of the `exclude` globs.
///
/// The same filter is used by the initial scan and the watcher so both see
/// the same set of files.
#[derive(Clone)]
pub struct PathFilter {
    root: PathBuf,
    exclude_set: Option<GlobSet>,
    excluded_files: Vec<PathBuf>,
    excluded_dirs: Vec<PathBuf>,
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFilter")
            .field("root", &self.root)
            .field("excluded_files", &self.excluded_files)
            .field("excluded_dirs", &self.excluded_dirs)
            .finish_non_exhaustive()
    }
}

impl PathFilter {
    /// Filter rooted at `root` with the given exclude globs.
    pub fn new(root: impl Into<PathBuf>, patterns: &[String]) -> Result<Self> {
        let exclude_set = if patterns.is_empty() {
            None
        } else {
            Some(build_globset(patterns).context("building exclude globset")?)
        };

        Ok(Self {
            root: root.into(),
            exclude_set,
            excluded_files: Vec::new(),
            excluded_dirs: Vec::new(),
        })
    }

    /// Filter for a running instance: the configured globs plus the store
    /// file, its side files and the audit log directory.
    ///
    /// Call this after the store and log directory exist so their paths
    /// resolve the same way watcher events do.
    pub fn from_config(cfg: &ConfigFile, root: &Path) -> Result<Self> {
        let db = resolve_lenient(&cfg.database_location);
        let mut filter = Self::new(root, &cfg.exclude)?
            .with_excluded_dir(resolve_lenient(&cfg.log_file_path));
        for suffix in STORE_SIDE_FILES {
            let mut side = db.clone().into_os_string();
            side.push(suffix);
            filter = filter.with_excluded_file(PathBuf::from(side));
        }
        Ok(filter.with_excluded_file(db))
    }

    pub fn with_excluded_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded_files.push(path.into());
        self
    }

    pub fn with_excluded_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded_dirs.push(path.into());
        self
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.excluded_files.iter().any(|f| f == path) {
            return true;
        }
        if self.excluded_dirs.iter().any(|d| path.starts_with(d)) {
            return true;
        }
        match (&self.exclude_set, relative_str(&self.root, path)) {
            (Some(set), Some(rel)) => set.is_match(rel),
            _ => false,
        }
    }
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

// src/config/validate.rs

use std::path::Path;

use globset::Glob;
use tracing::warn;

use crate::config::model::{
    ConfigFile, RawConfigFile, DEFAULT_LOG_FILE_HOURS, DEFAULT_NUM_THREADS,
    MAX_LOG_FILE_HOURS, MAX_NUM_THREADS, MIN_LOG_FILE_HOURS, MIN_NUM_THREADS,
};
use crate::errors::{FolderwatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = FolderwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_path_set("target_dir", &raw.target_dir)?;
        ensure_path_set("database_location", &raw.database_location)?;
        ensure_path_set("log_file_path", &raw.log_file_path)?;
        validate_excludes(&raw.exclude)?;

        Ok(ConfigFile {
            num_threads: effective_num_threads(raw.num_threads),
            new_log_file_hours: effective_log_file_hours(raw.new_log_file_hours),
            target_dir: raw.target_dir,
            database_location: raw.database_location,
            log_file_path: raw.log_file_path,
            exclude: raw.exclude,
            delete_failure_policy: raw.delete_failure_policy,
        })
    }
}

fn ensure_path_set(key: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(FolderwatchError::ConfigError(format!(
            "`{key}` must not be empty"
        )));
    }
    Ok(())
}

fn validate_excludes(patterns: &[String]) -> Result<()> {
    for pat in patterns {
        Glob::new(pat).map_err(|err| {
            FolderwatchError::ConfigError(format!("invalid exclude pattern {pat:?}: {err}"))
        })?;
    }
    Ok(())
}

/// Out-of-range worker counts fall back to the default rather than failing.
fn effective_num_threads(requested: i64) -> usize {
    if (MIN_NUM_THREADS..=MAX_NUM_THREADS).contains(&requested) {
        requested as usize
    } else {
        warn!(
            requested,
            default = DEFAULT_NUM_THREADS,
            "num_threads out of range {MIN_NUM_THREADS}..={MAX_NUM_THREADS}; using default"
        );
        DEFAULT_NUM_THREADS
    }
}

fn effective_log_file_hours(requested: i64) -> u32 {
    if (MIN_LOG_FILE_HOURS..=MAX_LOG_FILE_HOURS).contains(&requested) {
        requested as u32
    } else {
        warn!(
            requested,
            default = DEFAULT_LOG_FILE_HOURS,
            "new_log_file_hours out of range {MIN_LOG_FILE_HOURS}..={MAX_LOG_FILE_HOURS}; using default"
        );
        DEFAULT_LOG_FILE_HOURS
    }
}

// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::DeleteFailurePolicy;

pub const MIN_NUM_THREADS: i64 = 2;
pub const MAX_NUM_THREADS: i64 = 20;
pub const DEFAULT_NUM_THREADS: usize = 5;

pub const MIN_LOG_FILE_HOURS: i64 = 1;
pub const MAX_LOG_FILE_HOURS: i64 = 240;
pub const DEFAULT_LOG_FILE_HOURS: u32 = 1;

/// Configuration exactly as read from disk.
///
/// ```toml
/// target_dir = "/srv/inbox"
/// database_location = "folderwatch.db"
/// num_threads = 5
/// log_file_path = "logs"
/// new_log_file_hours = 1
/// exclude = ["**/*.tmp"]
/// delete_failure_policy = "report"
/// ```
///
/// The PascalCase keys of the older `config.json` layout (`TargetDir`,
/// `DatabaseLocation`, ...) are accepted as aliases. Numeric settings are kept
/// signed here so out-of-range values can be replaced during validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Directory whose files are tracked.
    #[serde(alias = "TargetDir")]
    pub target_dir: PathBuf,

    /// SQLite database file holding the change records.
    #[serde(default = "default_database_location", alias = "DatabaseLocation")]
    pub database_location: PathBuf,

    /// Number of dispatcher workers.
    #[serde(default = "default_num_threads", alias = "NumThreads")]
    pub num_threads: i64,

    /// Directory receiving the rotating audit log files.
    #[serde(default = "default_log_file_path", alias = "LogFilePath")]
    pub log_file_path: PathBuf,

    /// Hours before the audit log moves to a new file.
    #[serde(default = "default_new_log_file_hours", alias = "NewLogFileHours")]
    pub new_log_file_hours: i64,

    /// Glob patterns (relative to `target_dir`) that are never tracked.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub delete_failure_policy: DeleteFailurePolicy,
}

impl RawConfigFile {
    /// Raw config for `target_dir` with every other setting at its default.
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            database_location: default_database_location(),
            num_threads: default_num_threads(),
            log_file_path: default_log_file_path(),
            new_log_file_hours: default_new_log_file_hours(),
            exclude: Vec::new(),
            delete_failure_policy: DeleteFailurePolicy::default(),
        }
    }
}

fn default_database_location() -> PathBuf {
    PathBuf::from("folderwatch.db")
}

fn default_num_threads() -> i64 {
    DEFAULT_NUM_THREADS as i64
}

fn default_log_file_path() -> PathBuf {
    PathBuf::from("logs")
}

fn default_new_log_file_hours() -> i64 {
    i64::from(DEFAULT_LOG_FILE_HOURS)
}

/// Validated configuration handed to the rest of the application.
///
/// Build it through `ConfigFile::try_from(RawConfigFile)` (see
/// `validate.rs`) or [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub target_dir: PathBuf,
    pub database_location: PathBuf,
    /// Always within 2..=20.
    pub num_threads: usize,
    pub log_file_path: PathBuf,
    /// Always within 1..=240.
    pub new_log_file_hours: u32,
    pub exclude: Vec<String>,
    pub delete_failure_policy: DeleteFailurePolicy,
}

#![allow(dead_code)]

use std::path::PathBuf;

use folderwatch::config::{ConfigFile, RawConfigFile};
use folderwatch::types::DeleteFailurePolicy;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Goes through the same validation as a loaded file, so out-of-range
/// values are clamped the same way.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: RawConfigFile::new(target_dir),
        }
    }

    pub fn database_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database_location = path.into();
        self
    }

    pub fn log_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_file_path = path.into();
        self
    }

    pub fn num_threads(mut self, n: i64) -> Self {
        self.config.num_threads = n;
        self
    }

    pub fn new_log_file_hours(mut self, hours: i64) -> Self {
        self.config.new_log_file_hours = hours;
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.exclude.push(pattern.to_string());
        self
    }

    pub fn delete_failure_policy(mut self, policy: DeleteFailurePolicy) -> Self {
        self.config.delete_failure_policy = policy;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

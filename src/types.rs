use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Kind of change recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Found by the startup inventory pass.
    Initial,
    Add,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Initial => "Initial",
            ChangeKind::Add => "Add",
            ChangeKind::Update => "Update",
            ChangeKind::Delete => "Delete",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change record as written to the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileChangeLog {
    pub change_type: String,
    pub file_path: String,
    pub mode: String,
    pub size: i64,
    pub last_updated: DateTime<Local>,
}

/// Severity of a progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressType {
    Info,
    Error,
}

/// Progress record as written to the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogProgress {
    #[serde(rename = "type")]
    pub kind: ProgressType,
    pub info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What the store does when deleting a record fails.
///
/// - `Report`: log the failure and return it to the caller (default).
/// - `Insert`: log the failure and insert the event's record instead. This
///   is the legacy behaviour and leaves a record for a file that is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteFailurePolicy {
    #[default]
    Report,
    Insert,
}

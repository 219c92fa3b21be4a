// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolderwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A statement could not be built; the store itself is unusable.
    #[error("error preparing the {statement} statement: {source}")]
    Preparation {
        statement: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("File watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FolderwatchError {
    /// Errors that mean the process cannot keep tracking changes.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FolderwatchError::Preparation { .. }
                | FolderwatchError::LockPoisoned(_)
                | FolderwatchError::Watch(_)
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FolderwatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preparation_errors_are_fatal() {
        let err = FolderwatchError::Preparation {
            statement: "update record",
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("update record"));
    }

    #[test]
    fn plain_database_errors_are_not_fatal() {
        let err = FolderwatchError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(!err.is_fatal());
        assert!(!FolderwatchError::ConfigError("x".into()).is_fatal());
    }
}

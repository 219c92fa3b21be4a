// src/logging.rs

//! Console diagnostics for the operator.
//!
//! folderwatch writes to three places:
//! - the audit log files ([`crate::audit::AuditLog`]), the durable JSON
//!   record of every change and every store decision;
//! - stdout, which only gets the `[folderwatch]` lifecycle lines (target
//!   directory, scan size);
//! - stderr, through the `tracing` subscriber installed here: per-event
//!   debug traces, warnings about skipped log writes or dropped events, and
//!   audit errors mirrored by `AuditLog::log_error`.
//!
//! The stderr level is `--log-level`, else `FOLDERWATCH_LOG`, else `info`.
//! Nothing written here is needed to reconstruct what changed.

use anyhow::{anyhow, Result};
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

const LEVEL_ENV_VAR: &str = "FOLDERWATCH_LOG";

/// Flag first, then the environment value if it names a level, then `info`.
fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> tracing::Level {
    cli_level
        .map(level_from_log_level)
        .or_else(|| env_value.and_then(parse_level_str))
        .unwrap_or(tracing::Level::INFO)
}

/// Install the global console subscriber.
///
/// Fails if a global subscriber was already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = resolve_level(cli_level, std::env::var(LEVEL_ENV_VAR).ok().as_deref());

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("installing console logger: {err}"))?;

    Ok(())
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_strings_are_case_insensitive() {
        assert_eq!(parse_level_str(" Debug "), Some(tracing::Level::DEBUG));
        assert_eq!(parse_level_str("warning"), Some(tracing::Level::WARN));
        assert_eq!(parse_level_str("loud"), None);
    }

    #[test]
    fn flag_beats_environment_and_bad_values_fall_back() {
        assert_eq!(
            resolve_level(Some(LogLevel::Error), Some("trace")),
            tracing::Level::ERROR
        );
        assert_eq!(resolve_level(None, Some("debug")), tracing::Level::DEBUG);
        assert_eq!(resolve_level(None, Some("chatty")), tracing::Level::INFO);
        assert_eq!(resolve_level(None, None), tracing::Level::INFO);
    }
}

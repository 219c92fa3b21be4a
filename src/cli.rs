// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `folderwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "folderwatch",
    version,
    about = "Record every file change in a directory into SQLite and a rotating audit log.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML, or JSON when it ends in `.json`).
    ///
    /// Default: `folderwatch.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "folderwatch.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FOLDERWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate the config, print the effective settings, then exit.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

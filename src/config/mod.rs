// src/config/mod.rs

//! Configuration loading and validation for folderwatch.
//!
//! Responsibilities:
//! - Define the file-backed data model (`model.rs`).
//! - Load a config file from disk, TOML or legacy JSON (`loader.rs`).
//! - Validate and normalise the settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, RawConfigFile};

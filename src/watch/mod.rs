// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - wiring up a recursive `notify` watcher on the target directory;
//! - normalizing raw notify events into [`crate::engine::ChangeEvent`]s;
//! - leaving out excluded paths (configured globs, the store, the audit log).
//!
//! It does not touch the store; events go out over a channel to the engine.

pub mod normalize;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use normalize::{classify, normalize};
pub use patterns::PathFilter;
pub use watcher::{forward_events, spawn_watcher, WatcherHandle};

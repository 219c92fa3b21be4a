// src/audit/mod.rs

//! Audit log: the durable, append-only record of every observed change and
//! every store decision.
//!
//! - [`writer`] owns the rotating log file and the entry encoding.
//! - [`clock`] abstracts "now" so rotation can be driven by tests.

pub mod clock;
pub mod writer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use writer::{encode_entry, log_file_name, AuditLog};

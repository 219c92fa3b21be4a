// src/engine/dispatcher.rs

//! Mapping of change events onto change store operations.
//!
//! [`route`] is the pure decision; [`Dispatcher`] applies it against a
//! [`ChangeStore`]. The dispatcher never retries: the only retry-like
//! behaviour (update or delete falling back to insert) lives in the store.

use std::sync::Arc;

use tracing::debug;

use crate::engine::{ChangeEvent, Operation};
use crate::errors::Result;
use crate::store::{ChangeStore, DeleteOutcome, UpdateOutcome};

/// Store operation an event maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    Insert,
    Update,
    Delete,
}

/// Result of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Inserted,
    Updated(UpdateOutcome),
    Deleted(DeleteOutcome),
    /// Moves and renames are not tracked.
    Ignored,
}

/// Which store operation handles `op`, if any.
pub fn route(op: Operation) -> Option<StoreAction> {
    match op {
        Operation::Create => Some(StoreAction::Insert),
        Operation::Write | Operation::Chmod => Some(StoreAction::Update),
        Operation::Remove => Some(StoreAction::Delete),
        Operation::Move | Operation::Rename => None,
    }
}

/// Something that consumes change events, one at a time.
///
/// Production code uses [`Dispatcher`]; tests can plug in a recorder. Calls
/// may block, the worker pool runs them on the blocking thread pool.
pub trait EventHandler: Send + Sync + 'static {
    fn handle(&self, event: &ChangeEvent) -> Result<DispatchOutcome>;
}

/// Applies events to the change store.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: Arc<ChangeStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<ChangeStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<ChangeStore> {
        &self.store
    }
}

impl EventHandler for Dispatcher {
    fn handle(&self, event: &ChangeEvent) -> Result<DispatchOutcome> {
        match route(event.op) {
            Some(StoreAction::Insert) => self
                .store
                .insert_record(event)
                .map(|()| DispatchOutcome::Inserted),
            Some(StoreAction::Update) => self
                .store
                .update_record(event)
                .map(DispatchOutcome::Updated),
            Some(StoreAction::Delete) => self
                .store
                .delete_record(event)
                .map(DispatchOutcome::Deleted),
            None => {
                debug!(op = ?event.op, path = ?event.path, "dropping untracked operation");
                Ok(DispatchOutcome::Ignored)
            }
        }
    }
}

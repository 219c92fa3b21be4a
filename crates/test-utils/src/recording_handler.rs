use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use folderwatch::engine::{route, ChangeEvent, DispatchOutcome, EventHandler, Operation};
use folderwatch::errors::{FolderwatchError, Result};

/// How a [`RecordingHandler`] fails for a given path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// A non-fatal error; the worker logs it and carries on.
    Transient,
    /// A lock-poisoned error; the worker stops.
    Fatal,
}

/// An [`EventHandler`] that:
/// - records every event it is handed, in handling order
/// - optionally sleeps per event (to let other workers interleave)
/// - fails for configured paths.
#[derive(Default)]
pub struct RecordingHandler {
    handled: Arc<Mutex<Vec<ChangeEvent>>>,
    failures: HashMap<PathBuf, Failure>,
    delay: Option<Duration>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing_on(mut self, path: impl Into<PathBuf>, failure: Failure) -> Self {
        self.failures.insert(path.into(), failure);
        self
    }

    /// Shared view of the handled events.
    pub fn handled(&self) -> Arc<Mutex<Vec<ChangeEvent>>> {
        Arc::clone(&self.handled)
    }

    /// Handled operations for one path, in order.
    pub fn ops_for(&self, path: impl Into<PathBuf>) -> Vec<Operation> {
        let path = path.into();
        self.handled
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.path == path)
            .map(|e| e.op)
            .collect()
    }
}

impl EventHandler for RecordingHandler {
    fn handle(&self, event: &ChangeEvent) -> Result<DispatchOutcome> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.handled.lock().unwrap().push(event.clone());

        match self.failures.get(&event.path) {
            Some(Failure::Transient) => {
                return Err(FolderwatchError::Other(anyhow::anyhow!(
                    "simulated failure for {:?}",
                    event.path
                )));
            }
            Some(Failure::Fatal) => return Err(FolderwatchError::LockPoisoned("store")),
            None => {}
        }

        Ok(match route(event.op) {
            Some(_) => DispatchOutcome::Inserted,
            None => DispatchOutcome::Ignored,
        })
    }
}

// src/engine/pool.rs

//! Fixed-size pool of dispatch workers.
//!
//! Each worker owns a bounded channel. Events are assigned to a worker by a
//! hash of their path, so every event for a given path goes to the same
//! worker and is applied in the order it was submitted. Events for different
//! paths may be applied concurrently (the store still serializes statements).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::engine::dispatcher::EventHandler;
use crate::engine::ChangeEvent;
use crate::errors::{FolderwatchError, Result};

/// Index of the worker responsible for `path` in a pool of `workers`.
pub fn worker_for(path: &Path, workers: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    (hasher.finish() % workers.max(1) as u64) as usize
}

pub struct DispatchPool {
    senders: Vec<mpsc::Sender<ChangeEvent>>,
    workers: Vec<JoinHandle<Result<()>>>,
    /// Ids of workers that stopped on an error.
    stopped_rx: mpsc::UnboundedReceiver<usize>,
}

impl std::fmt::Debug for DispatchPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchPool")
            .field("workers", &self.workers.len())
            .finish()
    }
}

impl DispatchPool {
    /// Spawn `workers` workers (at least one) driving `handler`.
    pub fn spawn<H: EventHandler>(handler: Arc<H>, workers: usize, queue_capacity: usize) -> Self {
        let workers = workers.max(1);
        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);
        let (stopped_tx, stopped_rx) = mpsc::unbounded_channel();

        for id in 0..workers {
            let (tx, rx) = mpsc::channel::<ChangeEvent>(queue_capacity.max(1));
            senders.push(tx);
            handles.push(tokio::spawn(supervise_worker(
                id,
                Arc::clone(&handler),
                rx,
                stopped_tx.clone(),
            )));
        }

        info!(workers, "dispatch workers started");
        Self {
            senders,
            workers: handles,
            stopped_rx,
        }
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Queue `event` on the worker owning its path.
    ///
    /// Fails if that worker has stopped, which only happens after a fatal
    /// error; [`DispatchPool::shutdown`] then reports the cause.
    pub async fn submit(&self, event: ChangeEvent) -> Result<()> {
        let id = worker_for(&event.path, self.senders.len());
        self.senders[id]
            .send(event)
            .await
            .map_err(|_| FolderwatchError::Other(anyhow!("dispatch worker {id} has stopped")))
    }

    /// Resolves with the id of the first worker that stops on an error.
    ///
    /// Never resolves while every worker is healthy. Cancel-safe, so it can
    /// sit in a `select!` next to the event channel.
    pub async fn worker_stopped(&mut self) -> usize {
        match self.stopped_rx.recv().await {
            Some(id) => id,
            // Every worker exited cleanly; nothing will ever be reported.
            None => std::future::pending().await,
        }
    }

    /// Close every queue, let workers drain what is already queued and wait
    /// for them. Returns the first worker error, if any.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.senders);

        let mut first_err = None;
        for (id, handle) in self.workers.into_iter().enumerate() {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(FolderwatchError::Other(anyhow!(
                    "dispatch worker {id} panicked: {join_err}"
                ))),
            };
            if let Err(err) = result {
                first_err.get_or_insert(err);
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Run one worker and report it on `stopped_tx` if it ends with an error.
async fn supervise_worker<H: EventHandler>(
    id: usize,
    handler: Arc<H>,
    rx: mpsc::Receiver<ChangeEvent>,
    stopped_tx: mpsc::UnboundedSender<usize>,
) -> Result<()> {
    let result = run_worker(id, handler, rx).await;
    if result.is_err() {
        // The pool may already be gone during shutdown.
        let _ = stopped_tx.send(id);
    }
    result
}

async fn run_worker<H: EventHandler>(
    id: usize,
    handler: Arc<H>,
    mut rx: mpsc::Receiver<ChangeEvent>,
) -> Result<()> {
    while let Some(event) = rx.recv().await {
        let handler = Arc::clone(&handler);
        let (event, result) = tokio::task::spawn_blocking(move || {
            let result = handler.handle(&event);
            (event, result)
        })
        .await
        .map_err(|err| FolderwatchError::Other(anyhow!("dispatch worker {id} panicked: {err}")))?;

        match result {
            Ok(outcome) => {
                debug!(worker = id, op = ?event.op, path = ?event.path, ?outcome, "event applied");
            }
            Err(err) if err.is_fatal() => {
                error!(worker = id, path = ?event.path, error = %err, "fatal dispatch error");
                return Err(err);
            }
            Err(err) => {
                warn!(worker = id, op = ?event.op, path = ?event.path, error = %err, "event not applied");
            }
        }
    }

    debug!(worker = id, "dispatch worker finished (channel closed)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use chrono::Local;

    use super::*;
    use crate::engine::{DispatchOutcome, Operation};

    /// Fails fatally for one path, ignores everything else.
    struct FailOn(PathBuf);

    impl EventHandler for FailOn {
        fn handle(&self, event: &ChangeEvent) -> Result<DispatchOutcome> {
            if event.path == self.0 {
                Err(FolderwatchError::LockPoisoned("change store"))
            } else {
                Ok(DispatchOutcome::Ignored)
            }
        }
    }

    fn write(path: &str) -> ChangeEvent {
        ChangeEvent::without_metadata(Operation::Write, path, Local::now())
    }

    #[tokio::test]
    async fn stopped_worker_is_reported_without_further_traffic() {
        let mut pool = DispatchPool::spawn(Arc::new(FailOn(PathBuf::from("/w/bad"))), 3, 4);
        pool.submit(write("/w/bad")).await.unwrap();

        let id = tokio::time::timeout(Duration::from_secs(3), pool.worker_stopped())
            .await
            .unwrap();
        assert_eq!(id, worker_for(Path::new("/w/bad"), 3));

        let err = pool.shutdown().await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn healthy_pool_reports_nothing() {
        let mut pool = DispatchPool::spawn(Arc::new(FailOn(PathBuf::from("/w/bad"))), 2, 4);
        pool.submit(write("/w/fine")).await.unwrap();

        let waited = tokio::time::timeout(Duration::from_millis(100), pool.worker_stopped()).await;
        assert!(waited.is_err());
        pool.shutdown().await.unwrap();
    }

    #[test]
    fn assignment_is_stable_and_in_range() {
        let path = Path::new("/w/a.txt");
        let first = worker_for(path, 7);
        assert!(first < 7);
        for _ in 0..10 {
            assert_eq!(worker_for(path, 7), first);
        }
    }

    #[test]
    fn single_worker_takes_everything() {
        assert_eq!(worker_for(Path::new("/w/a"), 1), 0);
        assert_eq!(worker_for(Path::new("/w/b"), 0), 0);
    }
}

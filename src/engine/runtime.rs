// src/engine/runtime.rs

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::pool::DispatchPool;
use crate::engine::ChangeEvent;
use crate::errors::{FolderwatchError, Result};

/// Drains the shared change event channel into the dispatch pool.
///
/// Runs until the channel closes (the watcher stopped), then shuts the pool
/// down so everything already queued is applied. If any worker stops on a
/// fatal error, the runtime stops right away and returns that error, even
/// when no further event is headed for that worker.
pub struct Runtime {
    event_rx: mpsc::Receiver<ChangeEvent>,
    pool: DispatchPool,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(event_rx: mpsc::Receiver<ChangeEvent>, pool: DispatchPool) -> Self {
        Self { event_rx, pool }
    }

    /// Main event loop.
    pub async fn run(mut self) -> Result<()> {
        info!(workers = self.pool.len(), "folderwatch runtime started");

        loop {
            tokio::select! {
                received = self.event_rx.recv() => {
                    let Some(event) = received else { break };
                    debug!(op = ?event.op, path = ?event.path, "runtime received event");

                    if let Err(submit_err) = self.pool.submit(event).await {
                        warn!(error = %submit_err, "dispatch pool rejected event; stopping");
                        return self.stop_with(submit_err).await;
                    }
                }
                id = self.pool.worker_stopped() => {
                    warn!(worker = id, "dispatch worker stopped on an error; stopping");
                    return self
                        .stop_with(FolderwatchError::Other(anyhow!("dispatch worker {id} has stopped")))
                        .await;
                }
            }
        }

        info!("change event channel closed; draining dispatch workers");
        self.pool.shutdown().await?;
        info!("runtime exiting");
        Ok(())
    }

    /// Shut the pool down after a worker failure. The worker's own error
    /// wins over `fallback`.
    async fn stop_with(self, fallback: FolderwatchError) -> Result<()> {
        match self.pool.shutdown().await {
            Err(worker_err) => Err(worker_err),
            Ok(()) => Err(fallback),
        }
    }
}

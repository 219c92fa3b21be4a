// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::engine::ChangeEvent;
use crate::errors::{FolderwatchError, Result};
use crate::fs::FileSystem;
use crate::watch::normalize::normalize;
use crate::watch::patterns::PathFilter;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping it stops
/// watching, which in turn lets the forwarder task finish and closes the
/// change event channel.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` recursively and forward normalized change events to
/// `event_tx`.
///
/// Returns the watcher handle and the forwarder task. The task ends with
/// `Ok` when the watcher or the receiving side goes away, and with
/// [`FolderwatchError::Watch`] when the watcher reports an error.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    filter: PathFilter,
    fs: Arc<dyn FileSystem>,
    event_tx: mpsc::Sender<ChangeEvent>,
) -> Result<(WatcherHandle, JoinHandle<Result<()>>)> {
    let root = root.into();

    // Bridge from the blocking notify callback into the async world.
    let (raw_tx, raw_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Err(err) = raw_tx.send(res) {
                // No subscriber context on the notify thread.
                eprintln!("folderwatch: failed to forward notify event: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("file watcher started on {:?}", root);

    let forwarder = tokio::spawn(forward_events(root, filter, fs, raw_rx, event_tx));
    Ok((WatcherHandle { _inner: watcher }, forwarder))
}

/// Consume raw notify results until the source closes.
///
/// Split out of [`spawn_watcher`] so it can be driven by synthetic events.
pub async fn forward_events(
    root: PathBuf,
    filter: PathFilter,
    fs: Arc<dyn FileSystem>,
    mut raw_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    event_tx: mpsc::Sender<ChangeEvent>,
) -> Result<()> {
    while let Some(res) = raw_rx.recv().await {
        let event = match res {
            Ok(event) => event,
            Err(err) => {
                error!(error = %err, "file watch error");
                return Err(FolderwatchError::Watch(err));
            }
        };
        debug!(?event, "received notify event");

        for change in normalize(fs.as_ref(), &root, &event, Local::now()) {
            if filter.is_excluded(&change.path) {
                debug!(path = ?change.path, "excluded path; not forwarding");
                continue;
            }
            if event_tx.send(change).await.is_err() {
                debug!("change event channel closed; stopping forwarder");
                return Ok(());
            }
        }
    }

    debug!("watcher event loop finished");
    Ok(())
}

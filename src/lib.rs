// src/lib.rs

pub mod audit;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod store;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::audit::{AuditLog, SystemClock};
use crate::cli::CliArgs;
use crate::config::{load_and_validate, ConfigFile};
use crate::engine::{initial_scan, ChangeEvent, DispatchPool, Dispatcher, Runtime};
use crate::errors::{FolderwatchError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::store::ChangeStore;
use crate::watch::{spawn_watcher, PathFilter, WatcherHandle};

/// Capacity of the channel between the watcher and the runtime.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Capacity of each dispatch worker's queue.
const WORKER_QUEUE_CAPACITY: usize = 32;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - audit log and change store
/// - the initial inventory of the target directory
/// - dispatch pool and runtime
/// - the file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let audit = Arc::new(AuditLog::new(
        &cfg.log_file_path,
        cfg.new_log_file_hours,
        Arc::clone(&fs),
        Arc::new(SystemClock),
    ));
    let store = Arc::new(ChangeStore::open(
        &cfg.database_location,
        Arc::clone(&audit),
        cfg.delete_failure_policy,
    )?);

    // Canonical root so scan paths and watcher paths agree.
    let target = fs
        .canonicalize(&cfg.target_dir)
        .unwrap_or_else(|_| cfg.target_dir.clone());
    let filter = PathFilter::from_config(&cfg, &target)?;

    println!("[folderwatch] Target Dir {}", target.display());
    let summary = initial_scan(fs.as_ref(), &target, &filter, &store, &audit)?;
    info!(?summary, "initial inventory complete");

    let (event_tx, event_rx) = mpsc::channel::<ChangeEvent>(EVENT_CHANNEL_CAPACITY);
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&store)));
    let pool = DispatchPool::spawn(dispatcher, cfg.num_threads, WORKER_QUEUE_CAPACITY);
    let runtime = Runtime::new(event_rx, pool);

    let (watcher, forwarder) = spawn_watcher(target, filter, fs, event_tx)?;
    supervise(runtime, watcher, forwarder).await
}

/// Run until the runtime stops, the watcher fails or Ctrl-C arrives.
async fn supervise(
    runtime: Runtime,
    watcher: WatcherHandle,
    mut forwarder: JoinHandle<Result<()>>,
) -> Result<()> {
    let run = runtime.run();
    tokio::pin!(run);

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    let result = tokio::select! {
        res = &mut run => res,
        joined = &mut forwarder => match joined {
            // Watcher source closed: let the runtime drain what is queued.
            Ok(Ok(())) => run.await,
            Ok(Err(err)) => Err(err),
            Err(join_err) => Err(FolderwatchError::Other(anyhow!(
                "watch forwarder panicked: {join_err}"
            ))),
        },
        _ = shutdown => {
            info!("Ctrl-C received; stopping");
            Ok(())
        }
    };

    drop(watcher);
    debug!("watcher stopped");
    result
}

/// Print the effective settings after defaults and clamping.
fn print_dry_run(cfg: &ConfigFile) {
    println!("folderwatch dry-run");
    println!("  target_dir = {}", cfg.target_dir.display());
    println!("  database_location = {}", cfg.database_location.display());
    println!("  num_threads = {}", cfg.num_threads);
    println!("  log_file_path = {}", cfg.log_file_path.display());
    println!("  new_log_file_hours = {}", cfg.new_log_file_hours);
    println!("  delete_failure_policy = {:?}", cfg.delete_failure_policy);
    if !cfg.exclude.is_empty() {
        println!("  exclude: {:?}", cfg.exclude);
    }

    debug!("dry-run complete (nothing watched)");
}

pub mod builders;
pub mod recording_handler;

use std::path::Path;
use std::sync::Once;

use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Parse an audit log file (a run of CRLF-separated JSON objects).
pub fn read_log_entries(path: impl AsRef<Path>) -> anyhow::Result<Vec<Value>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_log_entries(&text)
}

/// Same as [`read_log_entries`] for text already in memory.
pub fn parse_log_entries(text: &str) -> anyhow::Result<Vec<Value>> {
    let mut entries = Vec::new();
    for value in serde_json::Deserializer::from_str(text).into_iter::<Value>() {
        entries.push(value?);
    }
    Ok(entries)
}

/// Only the `change_type` / `file_path` pairs of change entries, in order.
pub fn change_entries(entries: &[Value]) -> Vec<(String, String)> {
    entries
        .iter()
        .filter_map(|e| {
            Some((
                e.get("change_type")?.as_str()?.to_string(),
                e.get("file_path")?.as_str()?.to_string(),
            ))
        })
        .collect()
}

//! JSON-lines event reader.
//!
//! Each non-empty line is one `EventEnvelope`. Lines starting with `#` are
//! comments. Lines that fail to decode are logged and skipped; the engine
//! never sees them.

use std::path::PathBuf;

use rtg_core::EventEnvelope;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// What the reader got through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayReport {
    pub lines: u64,
    pub events: u64,
    pub decode_errors: u64,
}

/// Read `path` and send every decoded event to `tx`.
///
/// Stops early without error when the receiving side is gone.
pub async fn read_events(path: PathBuf, tx: mpsc::Sender<EventEnvelope>) -> AppResult<ReplayReport> {
    let file = File::open(&path)
        .await
        .map_err(|e| AppError::Replay(format!("Failed to open {}: {e}", path.display())))?;
    let mut lines = BufReader::new(file).lines();
    let mut report = ReplayReport::default();

    while let Some(line) = lines.next_line().await? {
        report.lines += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let envelope = match EventEnvelope::from_json_line(trimmed) {
            Ok(envelope) => envelope,
            Err(e) => {
                report.decode_errors += 1;
                warn!(line = report.lines, error = %e, "Skipping undecodable event");
                continue;
            }
        };
        if tx.send(envelope).await.is_err() {
            debug!(line = report.lines, "Event receiver closed, stopping reader");
            break;
        }
        report.events += 1;
    }

    info!(
        path = %path.display(),
        lines = report.lines,
        events = report.events,
        decode_errors = report.decode_errors,
        "Event file read"
    );
    Ok(report)
}

/// Run `read_events` on its own task.
pub fn spawn_reader(
    path: PathBuf,
    tx: mpsc::Sender<EventEnvelope>,
) -> JoinHandle<AppResult<ReplayReport>> {
    tokio::spawn(read_events(path, tx))
}

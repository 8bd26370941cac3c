//! Persistence of accepted snapshots
//!
//! Local append and sink delivery are independent: either may fail without
//! affecting the other, and neither failure is returned to the scheduler.

use crate::log::SnapshotLog;
use crate::sink::SnapshotSink;
use crate::snapshot::Snapshot;
use tracing::{debug, error, info, warn};

/// What happened to a recorded snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    /// Whether the local log was written
    pub stored: bool,
    /// Sink delivery result, `None` when no sink is configured
    pub forwarded: Option<bool>,
}

/// Writes snapshots to the local log and, if configured, the remote sink
pub struct SnapshotRecorder {
    log: SnapshotLog,
    sink: Option<SnapshotSink>,
}

impl SnapshotRecorder {
    /// Create a recorder
    pub fn new(log: SnapshotLog, sink: Option<SnapshotSink>) -> Self {
        Self { log, sink }
    }

    /// The local log
    pub fn log(&self) -> &SnapshotLog {
        &self.log
    }

    /// Persist locally and forward to the sink concurrently
    pub async fn record(&self, snapshot: Snapshot) -> RecordOutcome {
        let (stored, forwarded) = tokio::join!(self.store(&snapshot), self.forward(&snapshot));
        RecordOutcome { stored, forwarded }
    }

    async fn store(&self, snapshot: &Snapshot) -> bool {
        match self.log.append(snapshot.clone()).await {
            Ok(retained) => {
                info!(
                    bucket = %snapshot.bucket,
                    provers = snapshot.provers.len(),
                    retained,
                    "snapshot stored"
                );
                true
            }
            Err(e) => {
                error!(bucket = %snapshot.bucket, error = %e, "failed to persist snapshot");
                false
            }
        }
    }

    async fn forward(&self, snapshot: &Snapshot) -> Option<bool> {
        let sink = self.sink.as_ref()?;

        match sink.send(snapshot).await {
            Ok(()) => {
                debug!(bucket = %snapshot.bucket, url = sink.url(), "snapshot forwarded");
                Some(true)
            }
            Err(e) => {
                warn!(
                    bucket = %snapshot.bucket,
                    url = sink.url(),
                    error = %e,
                    "failed to forward snapshot to sink"
                );
                Some(false)
            }
        }
    }
}

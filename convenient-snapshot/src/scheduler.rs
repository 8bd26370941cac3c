//! Snapshot scheduling and per-session deduplication

use crate::recorder::{RecordOutcome, SnapshotRecorder};
use crate::snapshot::Snapshot;
use crate::window::{BucketKey, SnapshotWindow, snapshot_bucket_key};
use chrono::{DateTime, Utc};
use convenient_metrics::MetricsRow;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Decides when a snapshot is taken and hands it off for persistence
///
/// At most one snapshot is produced per bucket while this scheduler lives.
/// The bucket is remembered before anything is persisted, so a slow or
/// failing write never causes the same bucket to be attempted again.
pub struct SnapshotScheduler {
    window: SnapshotWindow,
    last_bucket: Option<BucketKey>,
    recorder: Arc<SnapshotRecorder>,
}

impl SnapshotScheduler {
    /// Create a scheduler using the default window
    pub fn new(recorder: Arc<SnapshotRecorder>) -> Self {
        Self {
            window: SnapshotWindow::default(),
            last_bucket: None,
            recorder,
        }
    }

    /// Use a custom eligibility window
    #[must_use]
    pub fn with_window(mut self, window: SnapshotWindow) -> Self {
        self.window = window;
        self
    }

    /// Treat `bucket` as already handled
    #[must_use]
    pub fn resume_from(mut self, bucket: Option<BucketKey>) -> Self {
        self.last_bucket = bucket;
        self
    }

    /// Seed the remembered bucket from the newest entry of the stored log
    ///
    /// A log that cannot be read leaves the scheduler unseeded.
    pub async fn resume_from_log(&mut self) {
        match self.recorder.log().latest_bucket().await {
            Ok(Some(bucket)) => {
                info!(bucket = %bucket, "resuming after last stored snapshot");
                self.last_bucket = Some(bucket);
            }
            Ok(None) => debug!("snapshot log empty, nothing to resume"),
            Err(e) => warn!(error = %e, "could not read snapshot log to resume"),
        }
    }

    /// Bucket of the last snapshot taken this session
    #[must_use]
    pub fn last_bucket(&self) -> Option<&BucketKey> {
        self.last_bucket.as_ref()
    }

    /// Eligibility window in use
    #[must_use]
    pub fn window(&self) -> SnapshotWindow {
        self.window
    }

    /// Decide whether `now` produces a new snapshot of `provers`
    ///
    /// Returns the snapshot to persist, having already remembered its bucket.
    pub fn decide(&mut self, now: DateTime<Utc>, provers: &[MetricsRow]) -> Option<Snapshot> {
        if provers.is_empty() {
            debug!("no metrics available, skipping snapshot check");
            return None;
        }

        if !self.window.contains(now) {
            return None;
        }

        let bucket = snapshot_bucket_key(now);
        if self.last_bucket.as_ref() == Some(&bucket) {
            debug!(bucket = %bucket, "snapshot already taken for bucket");
            return None;
        }

        self.last_bucket = Some(bucket.clone());
        Some(Snapshot::new(bucket, now, provers.to_vec()))
    }

    /// Run one scheduler tick
    ///
    /// When a snapshot is due it is persisted on a detached task; the handle
    /// is returned for callers that want to observe the outcome. Must be
    /// called from within a tokio runtime.
    pub fn tick(
        &mut self,
        now: DateTime<Utc>,
        provers: &[MetricsRow],
    ) -> Option<JoinHandle<RecordOutcome>> {
        let snapshot = self.decide(now, provers)?;
        info!(bucket = %snapshot.bucket, provers = snapshot.provers.len(), "taking snapshot");

        let recorder = Arc::clone(&self.recorder);
        Some(tokio::spawn(async move { recorder.record(snapshot).await }))
    }
}

//! Bucketed snapshots of prover metrics
//!
//! This crate decides when a point-in-time copy of the prover leaderboard is
//! taken and where it goes:
//!
//! - [`window`]: the eligibility window (first minutes of every other UTC
//!   hour, anchored at 10:00) and the canonical hour bucket key
//! - [`scheduler`]: at most one snapshot per bucket per running session
//! - [`log`] and [`store`]: a capped, append-only log over a pluggable store
//! - [`sink`]: optional forwarding of every snapshot to a remote endpoint
//! - [`watcher`]: the poll and snapshot-check timers with start/stop
//!
//! Every persistence and delivery failure is logged and swallowed; the only
//! authoritative state is which bucket the running session already handled.
//!
//! ## Usage
//!
//! ```no_run
//! use convenient_metrics::{AnalyticsClient, LabelledSource, ProverLabels};
//! use convenient_snapshot::{
//!     JsonFileStore, MetricsWatcher, SnapshotLog, SnapshotRecorder, SnapshotScheduler,
//!     SystemClock, WatcherConfig,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AnalyticsClient::new("https://analytics.example.com/q/provers")?;
//! let source = Arc::new(LabelledSource::new(client, ProverLabels::default()));
//!
//! let log = SnapshotLog::new(Arc::new(JsonFileStore::new("snapshots.json")));
//! let recorder = Arc::new(SnapshotRecorder::new(log, None));
//! let scheduler = SnapshotScheduler::new(recorder);
//!
//! let mut watcher = MetricsWatcher::new(
//!     source,
//!     scheduler,
//!     Arc::new(SystemClock),
//!     WatcherConfig::default(),
//! );
//! watcher.start()?;
//! // ...
//! watcher.stop().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(unused_results)]

pub mod log;
pub mod recorder;
pub mod scheduler;
pub mod sink;
pub mod snapshot;
pub mod store;
pub mod watcher;
pub mod window;

pub use log::{MAX_SNAPSHOTS, SnapshotLog, retain_latest};
pub use recorder::{RecordOutcome, SnapshotRecorder};
pub use scheduler::{Clock, SnapshotScheduler, SystemClock};
pub use sink::SnapshotSink;
pub use snapshot::Snapshot;
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
pub use watcher::{MetricsBoard, MetricsWatcher, WatcherConfig};
pub use window::{BucketKey, SnapshotWindow, is_snapshot_window, snapshot_bucket_key};

/// Error types for snapshot operations
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Reading or writing the local log failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The local log could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request to the sink failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The sink answered with a non-success status
    #[error("Sink error: {0}")]
    Sink(String),

    /// A window or timer setting is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The watcher is already running
    #[error("Watcher is already running")]
    AlreadyRunning,

    /// The scheduler was lost because its task did not shut down cleanly
    #[error("Snapshot scheduler is unavailable")]
    SchedulerUnavailable,
}

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

//! Capped, append-only snapshot log

use crate::{SnapshotError, SnapshotResult};
use crate::snapshot::Snapshot;
use crate::store::SnapshotStore;
use crate::window::BucketKey;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Maximum number of snapshots retained in the log
pub const MAX_SNAPSHOTS: usize = 1000;

/// Drop the oldest entries until at most `capacity` remain
pub fn retain_latest<T>(items: &mut Vec<T>, capacity: usize) {
    if items.len() > capacity {
        let excess = items.len() - capacity;
        drop(items.drain(..excess));
    }
}

/// Snapshot log over a [`SnapshotStore`], bounded to the most recent entries
///
/// Every append is a read-modify-write of the whole log. Appends are
/// serialized so overlapping writers cannot lose each other's entries.
pub struct SnapshotLog {
    store: Arc<dyn SnapshotStore>,
    capacity: usize,
    write_lock: Mutex<()>,
}

impl SnapshotLog {
    /// Create a log holding at most [`MAX_SNAPSHOTS`] entries
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self::with_capacity(store, MAX_SNAPSHOTS)
    }

    /// Create a log with a custom capacity (at least one entry)
    pub fn with_capacity(store: Arc<dyn SnapshotStore>, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
            write_lock: Mutex::new(()),
        }
    }

    /// Maximum number of retained snapshots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Load the stored log, oldest first
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the store cannot be read
    pub async fn load(&self) -> SnapshotResult<Vec<Snapshot>> {
        self.store.load().await
    }

    /// Bucket of the most recently stored snapshot
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the store cannot be read
    pub async fn latest_bucket(&self) -> SnapshotResult<Option<BucketKey>> {
        Ok(self.store.load().await?.pop().map(|s| s.bucket))
    }

    /// Append a snapshot, evict beyond capacity and write the log back
    ///
    /// A log that cannot be decoded is moved aside by the store and a new
    /// one is started. Any other read error aborts the append so the stored
    /// history is never overwritten.
    ///
    /// # Returns
    ///
    /// Number of snapshots retained after the append
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the log cannot be read or written
    pub async fn append(&self, snapshot: Snapshot) -> SnapshotResult<usize> {
        let _guard = self.write_lock.lock().await;

        let mut snapshots = match self.store.load().await {
            Ok(snapshots) => snapshots,
            Err(SnapshotError::Json(e)) => {
                warn!(error = %e, "snapshot log corrupt, starting a new one");
                self.store.set_aside().await?;
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        snapshots.push(snapshot);
        retain_latest(&mut snapshots, self.capacity);
        self.store.save(&snapshots).await?;

        Ok(snapshots.len())
    }
}

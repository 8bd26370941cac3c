//! Storage backends for the snapshot log
//!
//! A store only knows how to load and save the whole sequence; capping and
//! append semantics live in [`crate::log::SnapshotLog`].

use crate::SnapshotResult;
use crate::snapshot::Snapshot;
use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Durable backing for the snapshot log
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the full log; an absent log is empty
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the log exists but cannot be read or decoded
    async fn load(&self) -> SnapshotResult<Vec<Snapshot>>;

    /// Replace the stored log with `snapshots`
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the log cannot be written
    async fn save(&self, snapshots: &[Snapshot]) -> SnapshotResult<()>;

    /// Move a log that cannot be decoded out of the way, keeping its content
    ///
    /// Stores that cannot hold an undecodable log do nothing.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the log cannot be moved
    async fn set_aside(&self) -> SnapshotResult<()> {
        Ok(())
    }
}

/// Snapshot log kept as a single JSON array file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by the file at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the log file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an undecodable log is moved to, e.g. `snapshots.json.corrupt`
    #[must_use]
    pub fn corrupt_path(&self) -> PathBuf {
        self.sibling_path(".corrupt")
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling_path(".tmp")
    }

    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("snapshots"), OsString::from);
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> SnapshotResult<Vec<Snapshot>> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot log yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_slice(&data)?)
    }

    async fn save(&self, snapshots: &[Snapshot]) -> SnapshotResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec_pretty(snapshots)?;

        // write aside, then rename over the log so readers never see a torn file
        let temp = self.temp_path();
        let mut file = tokio::fs::File::create(&temp).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&temp, &self.path).await?;

        Ok(())
    }

    async fn set_aside(&self) -> SnapshotResult<()> {
        let corrupt = self.corrupt_path();
        tokio::fs::rename(&self.path, &corrupt).await?;
        warn!(path = %corrupt.display(), "corrupt snapshot log moved aside");
        Ok(())
    }
}

/// In-process store; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshots: Arc<Mutex<Vec<Snapshot>>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `snapshots`
    #[must_use]
    pub fn with_snapshots(snapshots: Vec<Snapshot>) -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(snapshots)),
        }
    }

    /// Copy of the stored log
    pub async fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots.lock().await.clone()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> SnapshotResult<Vec<Snapshot>> {
        Ok(self.snapshots.lock().await.clone())
    }

    async fn save(&self, snapshots: &[Snapshot]) -> SnapshotResult<()> {
        *self.snapshots.lock().await = snapshots.to_vec();
        Ok(())
    }
}

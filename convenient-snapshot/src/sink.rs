//! Optional remote sink receiving a copy of every snapshot

use crate::snapshot::Snapshot;
use crate::{SnapshotError, SnapshotResult};
use reqwest::Client;

/// HTTP endpoint that snapshots are POSTed to as JSON
#[derive(Clone)]
pub struct SnapshotSink {
    url: String,
    client: Client,
}

impl SnapshotSink {
    /// Create a sink for `url`; the URL is not validated
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }

    /// Sink for an optional configured URL; absent or blank disables it
    #[must_use]
    pub fn from_config(url: Option<&str>) -> Option<Self> {
        url.map(str::trim).filter(|u| !u.is_empty()).map(Self::new)
    }

    /// Target URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST a snapshot
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Http` if the request fails
    /// Returns `SnapshotError::Sink` if the sink returns an error status
    pub async fn send(&self, snapshot: &Snapshot) -> SnapshotResult<()> {
        let response = self.client.post(&self.url).json(snapshot).send().await?;

        if !response.status().is_success() {
            return Err(SnapshotError::Sink(format!(
                "Failed to deliver snapshot {}: {}",
                snapshot.bucket,
                response.status()
            )));
        }

        Ok(())
    }
}

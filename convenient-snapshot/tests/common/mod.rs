//! Shared fakes for the snapshot integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use convenient_metrics::{MetricsError, MetricsResult, MetricsRow, MetricsSource};
use convenient_snapshot::{Clock, Snapshot, SnapshotError, SnapshotResult, SnapshotStore};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub fn provers() -> Vec<MetricsRow> {
    vec![
        MetricsRow::new("Alpha", "0xAAAA", 12, 4_500.0),
        MetricsRow::new("Beta", "0xBBBB", 3, 1_250.5),
    ]
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Metrics source returning fixed rows, or an error while `failing` is set
pub struct FakeSource {
    rows: Vec<MetricsRow>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(rows: Vec<MetricsRow>) -> Self {
        Self {
            rows,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsSource for FakeSource {
    async fn fetch(&self) -> MetricsResult<Vec<MetricsRow>> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MetricsError::ServerError("503 Service Unavailable".into()));
        }
        Ok(self.rows.clone())
    }
}

/// Store whose every operation fails
pub struct FailingStore;

#[async_trait]
impl SnapshotStore for FailingStore {
    async fn load(&self) -> SnapshotResult<Vec<Snapshot>> {
        Err(SnapshotError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "load denied")))
    }

    async fn save(&self, _snapshots: &[Snapshot]) -> SnapshotResult<()> {
        Err(SnapshotError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "save denied")))
    }
}

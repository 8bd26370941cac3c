//! Snapshot eligibility windows and hour buckets

use crate::{SnapshotError, SnapshotResult};
use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// UTC hour the two-hourly cadence is anchored on
pub const ANCHOR_HOUR: u32 = 10;

/// Hours between eligible windows
pub const EVERY_HOURS: u32 = 2;

/// Minutes at the start of an eligible hour during which a snapshot may fire
pub const FRESH_MINUTES: u32 = 5;

/// Canonical identifier of one UTC hour, e.g. `2025-01-01T10:00Z`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketKey(String);

impl BucketKey {
    /// Get the key as a string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bucket key of the UTC hour containing `now`
#[must_use]
pub fn snapshot_bucket_key(now: DateTime<Utc>) -> BucketKey {
    BucketKey(now.format("%Y-%m-%dT%H:00Z").to_string())
}

/// Whether `now` falls in the default snapshot window
#[must_use]
pub fn is_snapshot_window(now: DateTime<Utc>) -> bool {
    SnapshotWindow::default().contains(now)
}

/// Recurring window during which snapshots may be taken
///
/// An hour is eligible when it is a whole multiple of `every_hours` away from
/// `anchor_hour`; only its first `fresh_minutes` minutes count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotWindow {
    anchor_hour: u32,
    every_hours: u32,
    fresh_minutes: u32,
}

impl Default for SnapshotWindow {
    fn default() -> Self {
        Self {
            anchor_hour: ANCHOR_HOUR,
            every_hours: EVERY_HOURS,
            fresh_minutes: FRESH_MINUTES,
        }
    }
}

impl SnapshotWindow {
    /// Create a custom window
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::InvalidConfig` if the anchor is not a valid
    /// hour, the cadence is not within 1..=24 hours, or the fresh span is not
    /// within 1..=60 minutes
    pub fn new(anchor_hour: u32, every_hours: u32, fresh_minutes: u32) -> SnapshotResult<Self> {
        if anchor_hour > 23 {
            return Err(SnapshotError::InvalidConfig(format!(
                "anchor hour {anchor_hour} is not a UTC hour"
            )));
        }
        if every_hours == 0 || every_hours > 24 {
            return Err(SnapshotError::InvalidConfig(format!(
                "window cadence of {every_hours} hours is outside 1..=24"
            )));
        }
        if fresh_minutes == 0 || fresh_minutes > 60 {
            return Err(SnapshotError::InvalidConfig(format!(
                "fresh span of {fresh_minutes} minutes is outside 1..=60"
            )));
        }

        Ok(Self {
            anchor_hour,
            every_hours,
            fresh_minutes,
        })
    }

    /// Whether `now` falls inside an eligible window
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        let hour = now.hour();
        let minute = now.minute();

        // kept in anchor form so an odd anchor hour still works
        let anchor_aligned = (hour + 24 - self.anchor_hour) % self.every_hours == 0;
        let fresh = minute < self.fresh_minutes;

        anchor_aligned && fresh
    }

    /// Start of the first window opening at or after `now`
    ///
    /// If `now` is inside an open window, that window's start is returned.
    #[must_use]
    pub fn next_opening(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let hour_start = now
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);

        let mut candidate = if self.contains(now) || now == hour_start {
            hour_start
        } else {
            hour_start + Duration::hours(1)
        };
        // every aligned hour of the day is reached within a day
        for _ in 0..24 {
            if self.contains(candidate) {
                break;
            }
            candidate += Duration::hours(1);
        }
        candidate
    }

    /// Anchor hour (UTC)
    #[must_use]
    pub fn anchor_hour(&self) -> u32 {
        self.anchor_hour
    }

    /// Hours between windows
    #[must_use]
    pub fn every_hours(&self) -> u32 {
        self.every_hours
    }

    /// Length of the window in minutes
    #[must_use]
    pub fn fresh_minutes(&self) -> u32 {
        self.fresh_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_window_every_hour_and_minute() {
        for hour in 0..24 {
            for minute in 0..60 {
                let eligible = is_snapshot_window(at(2025, 3, 14, hour, minute));
                let expected = hour % 2 == 0 && minute < 5;
                assert_eq!(eligible, expected, "{hour:02}:{minute:02}");
            }
        }
    }

    #[test]
    fn test_odd_anchor_shifts_window() {
        let window = SnapshotWindow::new(11, 2, 5).unwrap();
        assert!(window.contains(at(2025, 1, 1, 11, 0)));
        assert!(window.contains(at(2025, 1, 1, 1, 4)));
        assert!(!window.contains(at(2025, 1, 1, 10, 0)));
        assert!(!window.contains(at(2025, 1, 1, 11, 5)));
    }

    #[test]
    fn test_anchor_before_current_hour_wraps() {
        let window = SnapshotWindow::new(23, 3, 5).unwrap();
        // 23 -> 2 -> 5 -> ... -> 20
        assert!(window.contains(at(2025, 1, 1, 2, 0)));
        assert!(window.contains(at(2025, 1, 1, 20, 1)));
        assert!(!window.contains(at(2025, 1, 1, 21, 0)));
    }

    #[test]
    fn test_invalid_windows_rejected() {
        assert!(SnapshotWindow::new(24, 2, 5).is_err());
        assert!(SnapshotWindow::new(10, 0, 5).is_err());
        assert!(SnapshotWindow::new(10, 25, 5).is_err());
        assert!(SnapshotWindow::new(10, 2, 0).is_err());
        assert!(SnapshotWindow::new(10, 2, 61).is_err());
        assert_eq!(SnapshotWindow::new(10, 2, 5).unwrap(), SnapshotWindow::default());
    }

    #[test]
    fn test_next_opening() {
        let window = SnapshotWindow::default();
        // inside a window: its own start
        assert_eq!(window.next_opening(at(2025, 1, 1, 10, 3)), at(2025, 1, 1, 10, 0));
        // eligible hour but past the fresh span
        assert_eq!(window.next_opening(at(2025, 1, 1, 10, 7)), at(2025, 1, 1, 12, 0));
        assert_eq!(window.next_opening(at(2025, 1, 1, 11, 0)), at(2025, 1, 1, 12, 0));
        assert_eq!(window.next_opening(at(2025, 1, 1, 23, 30)), at(2025, 1, 2, 0, 0));
    }

    #[test]
    fn test_bucket_key_format() {
        let key = snapshot_bucket_key(at(2025, 1, 2, 3, 4));
        assert_eq!(key.as_str(), "2025-01-02T03:00Z");
        assert_eq!(key.to_string(), "2025-01-02T03:00Z");
    }

    #[test]
    fn test_bucket_key_stable_within_hour() {
        let start = snapshot_bucket_key(at(2025, 6, 1, 10, 0));
        let end = snapshot_bucket_key(Utc.with_ymd_and_hms(2025, 6, 1, 10, 59, 59).unwrap());
        assert_eq!(start, end);
        assert_ne!(start, snapshot_bucket_key(at(2025, 6, 1, 11, 0)));
    }

    #[test]
    fn test_bucket_key_across_day_rollover() {
        let late = snapshot_bucket_key(at(2025, 1, 1, 23, 30));
        let early = snapshot_bucket_key(at(2025, 1, 2, 0, 30));
        assert_eq!(late.as_str(), "2025-01-01T23:00Z");
        assert_eq!(early.as_str(), "2025-01-02T00:00Z");
        assert_ne!(late, early);
    }

    #[test]
    fn test_bucket_key_serializes_as_string() {
        let key = snapshot_bucket_key(at(2025, 1, 1, 10, 1));
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2025-01-01T10:00Z\"");
    }
}

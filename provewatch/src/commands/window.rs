//! Window command: explain the snapshot window for a moment

use chrono::{DateTime, Utc};
use convenient_snapshot::{SnapshotWindow, snapshot_bucket_key};

/// Human readable description of `now` against the default window
pub fn describe(now: DateTime<Utc>) -> String {
    let window = SnapshotWindow::default();
    let eligible = window.contains(now);

    let mut lines = vec![
        format!("Time:         {}", now.format("%Y-%m-%dT%H:%M:%SZ")),
        format!("Bucket:       {}", snapshot_bucket_key(now)),
        format!("Eligible:     {}", if eligible { "yes" } else { "no" }),
        format!(
            "Window:       first {} minutes of every {} hours from {:02}:00 UTC",
            window.fresh_minutes(),
            window.every_hours(),
            window.anchor_hour()
        ),
    ];
    if !eligible {
        lines.push(format!(
            "Next opening: {}",
            window.next_opening(now).format("%Y-%m-%dT%H:%MZ")
        ));
    }
    lines.join("\n")
}

/// Print the window description for `at`, or for now
pub fn execute(at: Option<DateTime<Utc>>) {
    println!("{}", describe(at.unwrap_or_else(Utc::now)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_describe_inside_window() {
        let text = describe(Utc.with_ymd_and_hms(2025, 1, 1, 10, 2, 0).unwrap());

        assert!(text.contains("Bucket:       2025-01-01T10:00Z"));
        assert!(text.contains("Eligible:     yes"));
        assert!(!text.contains("Next opening"));
    }

    #[test]
    fn test_describe_outside_window() {
        let text = describe(Utc.with_ymd_and_hms(2025, 1, 1, 23, 30, 0).unwrap());

        assert!(text.contains("Eligible:     no"));
        assert!(text.contains("Next opening: 2025-01-02T00:00Z"));
    }
}

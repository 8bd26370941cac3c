//! Snapshot record

use crate::window::BucketKey;
use chrono::{DateTime, SubsecRound, Utc};
use convenient_metrics::MetricsRow;
use serde::{Deserialize, Serialize};

/// Point-in-time copy of the prover leaderboard, tagged with its bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Hour bucket this snapshot was taken for
    pub bucket: BucketKey,
    /// Capture time, millisecond precision
    #[serde(with = "iso8601_millis")]
    pub captured_at: DateTime<Utc>,
    /// Provers in leaderboard order
    pub provers: Vec<MetricsRow>,
}

impl Snapshot {
    /// Create a snapshot; `captured_at` is truncated to milliseconds so the
    /// in-memory value equals what is stored
    #[must_use]
    pub fn new(bucket: BucketKey, captured_at: DateTime<Utc>, provers: Vec<MetricsRow>) -> Self {
        Self {
            bucket,
            captured_at: captured_at.trunc_subsecs(3),
            provers,
        }
    }

    /// Sum of cycles proved across all provers
    #[must_use]
    pub fn total_cycles(&self) -> f64 {
        self.provers.iter().map(|p| p.cycles_proved).sum()
    }
}

/// `2025-01-01T10:02:00.000Z` on write, any RFC 3339 timestamp on read
mod iso8601_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

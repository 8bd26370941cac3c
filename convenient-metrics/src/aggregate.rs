//! Per-prover aggregation of analytics rows

use crate::labels::{ProverLabels, normalize_address};
use crate::parse::RawRow;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Aggregated metrics for one prover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    /// Display label
    pub label: String,
    /// Lowercase prover address
    pub address: String,
    /// Orders taken
    pub orders_taken: u64,
    /// Cycles proved
    pub cycles_proved: f64,
}

impl MetricsRow {
    /// Create a new metrics row, normalizing the address
    pub fn new(
        label: impl Into<String>,
        address: &str,
        orders_taken: u64,
        cycles_proved: f64,
    ) -> Self {
        Self {
            label: label.into(),
            address: normalize_address(address),
            orders_taken,
            cycles_proved,
        }
    }
}

/// Group raw rows by prover address and sum their counters
///
/// Addresses are compared case-insensitively; rows without an address are
/// dropped. The result is sorted by cycles proved (descending), then orders
/// taken (descending), then address.
#[must_use]
pub fn aggregate(rows: &[RawRow], labels: &ProverLabels) -> Vec<MetricsRow> {
    let mut totals: HashMap<String, (u64, f64)> = HashMap::new();

    for row in rows {
        let address = normalize_address(&row.prover_addr);
        if address.is_empty() {
            continue;
        }
        let entry = totals.entry(address).or_insert((0, 0.0));
        entry.0 = entry.0.saturating_add(row.orders_taken);
        entry.1 += row.cycles_proved;
    }

    let mut provers: Vec<MetricsRow> = totals
        .into_iter()
        .map(|(address, (orders_taken, cycles_proved))| MetricsRow {
            label: labels.label_for(&address),
            address,
            orders_taken,
            cycles_proved,
        })
        .collect();

    provers.sort_by(leaderboard_order);
    provers
}

fn leaderboard_order(a: &MetricsRow, b: &MetricsRow) -> Ordering {
    b.cycles_proved
        .total_cmp(&a.cycles_proved)
        .then_with(|| b.orders_taken.cmp(&a.orders_taken))
        .then_with(|| a.address.cmp(&b.address))
}

/// Totals across all provers
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsSummary {
    /// Number of distinct provers
    pub provers: usize,
    /// Sum of orders taken
    pub total_orders: u64,
    /// Sum of cycles proved
    pub total_cycles: f64,
}

impl MetricsSummary {
    /// Compute totals for a set of rows
    #[must_use]
    pub fn from_rows(rows: &[MetricsRow]) -> Self {
        rows.iter().fold(
            Self {
                provers: rows.len(),
                ..Self::default()
            },
            |mut summary, row| {
                summary.total_orders = summary.total_orders.saturating_add(row.orders_taken);
                summary.total_cycles += row.cycles_proved;
                summary
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(addr: &str, orders: u64, cycles: f64) -> RawRow {
        RawRow {
            prover_addr: addr.to_string(),
            orders_taken: orders,
            cycles_proved: cycles,
        }
    }

    #[test]
    fn test_groups_addresses_case_insensitively() {
        let rows = vec![raw("0xAAA", 2, 10.0), raw("0xaaa", 3, 5.5), raw("0xBBB", 1, 1.0)];
        let provers = aggregate(&rows, &ProverLabels::default());

        assert_eq!(provers.len(), 2);
        assert_eq!(provers[0].address, "0xaaa");
        assert_eq!(provers[0].orders_taken, 5);
        assert!((provers[0].cycles_proved - 15.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_skips_rows_without_address() {
        let rows = vec![raw("", 9, 99.0), raw("   ", 1, 1.0), raw("0xccc", 1, 1.0)];
        let provers = aggregate(&rows, &ProverLabels::default());

        assert_eq!(provers.len(), 1);
        assert_eq!(provers[0].address, "0xccc");
    }

    #[test]
    fn test_sorted_by_cycles_then_orders_then_address() {
        let rows = vec![
            raw("0x03", 1, 5.0),
            raw("0x02", 7, 5.0),
            raw("0x01", 7, 5.0),
            raw("0x04", 0, 50.0),
        ];
        let provers = aggregate(&rows, &ProverLabels::default());
        let order: Vec<&str> = provers.iter().map(|p| p.address.as_str()).collect();

        assert_eq!(order, vec!["0x04", "0x01", "0x02", "0x03"]);
    }

    #[test]
    fn test_applies_labels() {
        let labels: ProverLabels = [("0xAAA", "Alpha")].into_iter().collect();
        let provers = aggregate(&[raw("0xaaa", 1, 1.0)], &labels);
        assert_eq!(provers[0].label, "Alpha");
    }

    #[test]
    fn test_summary() {
        let rows = vec![
            MetricsRow::new("a", "0xA", 3, 1.5),
            MetricsRow::new("b", "0xB", 4, 2.5),
        ];
        let summary = MetricsSummary::from_rows(&rows);

        assert_eq!(summary.provers, 2);
        assert_eq!(summary.total_orders, 7);
        assert!((summary.total_cycles - 4.0).abs() < f64::EPSILON);
        assert_eq!(MetricsSummary::from_rows(&[]), MetricsSummary::default());
    }
}

//! Plain-text rendering of leaderboards and snapshots

use convenient_metrics::{MetricsRow, MetricsSummary};
use convenient_snapshot::{MetricsBoard, Snapshot};
use std::fmt::Write;

/// Compact count with a K/M/B/T suffix, e.g. `12.35M`
pub fn format_count(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    for (scale, suffix) in UNITS {
        if value >= scale {
            return format!("{:.2}{suffix}", value / scale);
        }
    }
    format!("{value:.0}")
}

/// Leaderboard table followed by a totals line
pub fn table(rows: &[MetricsRow]) -> String {
    let label_width = rows
        .iter()
        .map(|row| row.label.chars().count())
        .max()
        .unwrap_or(0)
        .max("PROVER".len());
    let address_width = rows
        .iter()
        .map(|row| row.address.len())
        .max()
        .unwrap_or(0)
        .max("ADDRESS".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<3} {:<label_width$}  {:<address_width$}  {:>8}  {:>10}",
        "#", "PROVER", "ADDRESS", "ORDERS", "CYCLES"
    );
    for (rank, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<3} {:<label_width$}  {:<address_width$}  {:>8}  {:>10}",
            rank + 1,
            row.label,
            row.address,
            row.orders_taken,
            format_count(row.cycles_proved)
        );
    }

    let summary = MetricsSummary::from_rows(rows);
    let _ = write!(
        out,
        "{} provers, {} orders, {} cycles",
        summary.provers,
        summary.total_orders,
        format_count(summary.total_cycles)
    );
    out
}

/// Board as shown by `provewatch watch`
pub fn board(board: &MetricsBoard) -> String {
    let mut out = String::new();

    match board.updated_at {
        Some(at) => {
            let _ = writeln!(out, "Updated {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        None => {
            let _ = writeln!(out, "No metrics fetched yet");
        }
    }
    if let Some(error) = &board.last_error {
        let _ = writeln!(out, "Last poll failed: {error}");
    }
    if board.has_data() {
        out.push_str(&table(&board.provers));
    }
    out
}

/// One line per snapshot
pub fn snapshots(snapshots: &[Snapshot]) -> String {
    snapshots
        .iter()
        .map(|snapshot| {
            format!(
                "{}  captured {}  {} provers  {} cycles",
                snapshot.bucket,
                snapshot.captured_at.format("%Y-%m-%d %H:%M:%S"),
                snapshot.provers.len(),
                format_count(snapshot.total_cycles())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! Integration tests: analytics response body to aggregated leaderboard

use convenient_metrics::{MetricsSummary, ProverLabels, aggregate, parse_response};
use serde_json::json;

#[test]
fn test_response_to_leaderboard() {
    let body = json!({
        "rows": [
            { "prover_addr": "0xAbC0000000000000000000000000000000000001", "orders_taken": "4", "cycles_proved": "1,500.25M" },
            { "prover_addr": "0xabc0000000000000000000000000000000000001", "orders_taken": 1, "cycles_proved": 500 },
            { "prover_addr": "0xdef0000000000000000000000000000000000002", "orders_taken": "10", "cycles_proved": "garbage" },
            { "prover_addr": null, "orders_taken": 99, "cycles_proved": 99 }
        ]
    });

    let labels: ProverLabels = [("0xABC0000000000000000000000000000000000001", "Alpha")]
        .into_iter()
        .collect();

    let raw = parse_response(&body).unwrap();
    assert_eq!(raw.len(), 4);

    let provers = aggregate(&raw, &labels);
    assert_eq!(provers.len(), 2);

    assert_eq!(provers[0].label, "Alpha");
    assert_eq!(provers[0].address, "0xabc0000000000000000000000000000000000001");
    assert_eq!(provers[0].orders_taken, 5);
    assert!((provers[0].cycles_proved - 2000.25).abs() < 1e-9);

    assert_eq!(provers[1].label, "0xdef0...0002");
    assert_eq!(provers[1].orders_taken, 10);
    assert_eq!(provers[1].cycles_proved, 0.0);

    let summary = MetricsSummary::from_rows(&provers);
    assert_eq!(summary.provers, 2);
    assert_eq!(summary.total_orders, 15);
}

#[test]
fn test_empty_rows_give_empty_leaderboard() {
    let raw = parse_response(&json!({ "data": [] })).unwrap();
    assert!(aggregate(&raw, &ProverLabels::default()).is_empty());
}

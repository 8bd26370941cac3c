//! Tolerant parsing of analytics rows
//!
//! The analytics endpoint returns numbers either as JSON numbers or as
//! strings such as `"1,204"` or `"12.5K"`. Anything that cannot be read as a
//! number counts as zero; parsing never fails a poll.

use crate::{MetricsError, MetricsResult};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?")
        .expect("leading number pattern is valid")
});

/// One row as returned by the analytics endpoint, numbers already parsed
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// Prover address exactly as the endpoint reported it
    pub prover_addr: String,
    /// Orders taken by the prover in this row
    pub orders_taken: u64,
    /// Cycles proved by the prover in this row
    pub cycles_proved: f64,
}

impl RawRow {
    /// Build a row from one JSON object of the response
    ///
    /// Missing or mistyped fields fall back to an empty address and zero
    /// counts.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let prover_addr = value
            .get("prover_addr")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Self {
            prover_addr,
            orders_taken: value.get("orders_taken").map_or(0, parse_orders),
            cycles_proved: value.get("cycles_proved").map_or(0.0, cycles_from_value),
        }
    }
}

/// Parse a cycle count from its textual form
///
/// Grouping separators (`,`, `_`, whitespace) are dropped, then only the
/// leading numeric substring is read. Unit suffixes are ignored, so
/// `"12.5K"` yields `12.5`. Text without a numeric prefix yields `0.0`, as do
/// negative or non-finite values.
#[must_use]
pub fn parse_cycles(text: &str) -> f64 {
    let compact: String = text
        .chars()
        .filter(|c| *c != ',' && *c != '_' && !c.is_whitespace())
        .collect();

    LEADING_NUMBER
        .find(&compact)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map_or(0.0, non_negative)
}

/// Parse an order count from a JSON number or numeric string
///
/// Fractions are truncated; malformed or negative values yield `0`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_orders(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .unwrap_or_else(|| n.as_f64().map_or(0, |f| non_negative(f).trunc() as u64)),
        Value::String(s) => parse_cycles(s).trunc() as u64,
        _ => 0,
    }
}

/// Extract the row array from a response body
///
/// The `rows` array is preferred; `data` is the fallback.
///
/// # Errors
///
/// Returns `MetricsError::MalformedBody` if neither array is present
pub fn parse_response(body: &Value) -> MetricsResult<Vec<RawRow>> {
    let rows = body
        .get("rows")
        .and_then(Value::as_array)
        .or_else(|| body.get("data").and_then(Value::as_array))
        .ok_or_else(|| MetricsError::MalformedBody("expected a `rows` or `data` array".into()))?;

    Ok(rows.iter().map(RawRow::from_value).collect())
}

fn cycles_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().map_or(0.0, non_negative),
        Value::String(s) => parse_cycles(s),
        _ => 0.0,
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

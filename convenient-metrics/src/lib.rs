//! Prover metrics client for a remote analytics API
//!
//! This crate fetches tabular prover rows from an analytics endpoint and turns
//! them into one [`MetricsRow`] per prover address.
//!
//! # Features
//!
//! - Async HTTP client using reqwest
//! - Tolerant numeric parsing (malformed values count as zero)
//! - Per-address aggregation with configurable display labels
//! - Type-safe error handling
//!
//! # Example
//!
//! ```no_run
//! use convenient_metrics::{AnalyticsClient, ProverLabels, aggregate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AnalyticsClient::new("https://analytics.example.com/query")?;
//!
//!     let raw = client.fetch_rows().await?;
//!     let provers = aggregate(&raw, &ProverLabels::default());
//!     for prover in &provers {
//!         println!("{}: {} cycles", prover.label, prover.cycles_proved);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(unused_results)]

pub mod aggregate;
pub mod client;
pub mod labels;
pub mod parse;

pub use aggregate::{MetricsRow, MetricsSummary, aggregate};
pub use client::{AnalyticsClient, LabelledSource, MetricsSource};
pub use labels::ProverLabels;
pub use parse::{RawRow, parse_cycles, parse_orders, parse_response};

/// Error types for metrics operations
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Analytics server answered with a non-success status
    #[error("Server error: {0}")]
    ServerError(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Response body did not carry a row array
    #[error("Malformed response body: {0}")]
    MalformedBody(String),
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;

//! Provewatch command-line interface
//!
//! - `watch`: poll metrics and take snapshots until interrupted
//! - `show`: fetch the leaderboard once
//! - `log`: list recorded snapshots
//! - `window`: explain the snapshot window for a moment

use crate::config::{LogArgs, SourceArgs, WatchArgs};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

pub mod log;
pub mod show;
pub mod watch;
pub mod window;

/// Provewatch - prover metrics watcher with bucketed snapshots
#[derive(Parser)]
#[command(name = "provewatch")]
#[command(about = "Watches prover metrics and records two-hourly leaderboard snapshots")]
#[command(version)]
pub struct Cli {
    /// Print debug information
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll metrics and record snapshots until Ctrl-C
    Watch(WatchArgs),

    /// Fetch and print the prover leaderboard once
    Show {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// List recorded snapshots, oldest first
    Log {
        #[command(flatten)]
        log: LogArgs,

        /// Only the newest N snapshots
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print the snapshots as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show snapshot eligibility and bucket for a moment
    Window {
        /// RFC 3339 timestamp (default: now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

//! Provewatch - prover metrics watcher with bucketed snapshots
//!
//! Orchestrates:
//! 1. Polling the analytics endpoint (using convenient-metrics)
//! 2. Rendering the prover leaderboard
//! 3. Two-hourly deduplicated snapshots (using convenient-snapshot)

mod commands;
mod config;
mod render;

use clap::Parser;
use commands::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "provewatch=info,convenient_snapshot=info,convenient_metrics=info";
const DEBUG_FILTER: &str = "provewatch=debug,convenient_snapshot=debug,convenient_metrics=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is left to the tables
    let default_filter = if cli.debug { DEBUG_FILTER } else { DEFAULT_FILTER };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Watch(args) => commands::watch::execute(&args).await,
        Commands::Show { source, json } => commands::show::execute(&source, json).await,
        Commands::Log { log, limit, json } => commands::log::execute(&log, limit, json).await,
        Commands::Window { at } => {
            commands::window::execute(at);
            Ok(())
        }
    }
}

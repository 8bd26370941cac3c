//! Command-line and environment configuration

use clap::Args;
use convenient_metrics::{AnalyticsClient, LabelledSource, MetricsResult, ProverLabels};
use convenient_snapshot::{
    JsonFileStore, MemoryStore, SnapshotSink, SnapshotStore, WatcherConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Where metrics come from and how provers are named
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Analytics endpoint returning prover rows
    #[arg(long, env = "PROVEWATCH_ANALYTICS_URL")]
    pub analytics_url: String,

    /// Display name for a prover address (repeatable)
    #[arg(long = "label", value_name = "ADDR=NAME", value_parser = parse_label)]
    pub labels: Vec<(String, String)>,
}

impl SourceArgs {
    /// Label set built from the `--label` assignments
    pub fn prover_labels(&self) -> ProverLabels {
        self.labels
            .iter()
            .map(|(address, label)| (address, label.as_str()))
            .collect()
    }

    /// Client for the configured endpoint
    pub fn client(&self) -> MetricsResult<AnalyticsClient> {
        AnalyticsClient::new(&self.analytics_url)
    }

    /// Labelled metrics source for the watcher
    pub fn labelled_source(&self) -> MetricsResult<LabelledSource> {
        Ok(LabelledSource::new(self.client()?, self.prover_labels()))
    }
}

/// Location of the local snapshot log
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Snapshot log file
    #[arg(long, env = "PROVEWATCH_LOG_PATH", default_value = "provewatch-snapshots.json")]
    pub log_path: PathBuf,
}

impl LogArgs {
    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.log_path)
    }
}

/// Settings for `provewatch watch`
#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub log: LogArgs,

    /// Endpoint every snapshot is also POSTed to
    #[arg(long, env = "PROVEWATCH_SNAPSHOT_SINK_URL")]
    pub sink_url: Option<String>,

    /// Seconds between metric polls
    #[arg(
        long,
        env = "PROVEWATCH_POLL_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_secs: u64,

    /// Seconds between snapshot checks
    #[arg(
        long,
        env = "PROVEWATCH_CHECK_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub check_secs: u64,

    /// Treat the newest bucket in the log as already handled
    #[arg(long)]
    pub resume: bool,

    /// Keep snapshots in memory instead of the log file
    #[arg(long)]
    pub no_persist: bool,
}

impl WatchArgs {
    pub fn watcher_config(&self) -> WatcherConfig {
        WatcherConfig {
            poll_interval: Duration::from_secs(self.poll_secs),
            check_interval: Duration::from_secs(self.check_secs),
            ..WatcherConfig::default()
        }
    }

    /// Snapshot store, in memory with `--no-persist`
    pub fn store(&self) -> Arc<dyn SnapshotStore> {
        if self.no_persist {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(self.log.store())
        }
    }

    pub fn sink(&self) -> Option<SnapshotSink> {
        SnapshotSink::from_config(self.sink_url.as_deref())
    }
}

fn parse_label(assignment: &str) -> Result<(String, String), String> {
    ProverLabels::parse_assignment(assignment)
        .ok_or_else(|| format!("expected ADDR=NAME, got '{assignment}'"))
}

//! Poll and snapshot-check timers
//!
//! Two independent tasks share one shutdown signal:
//!
//! - the poller fetches metrics on `poll_interval` and publishes a
//!   [`MetricsBoard`] on a watch channel
//! - the checker reads the latest board on `check_interval` (first check
//!   after `initial_check_delay`) and drives the [`SnapshotScheduler`]
//!
//! A slow fetch never delays a snapshot check and vice versa. Once
//! [`MetricsWatcher::stop`] returns, neither timer fires again.

use crate::scheduler::{Clock, SnapshotScheduler};
use crate::{SnapshotError, SnapshotResult};
use chrono::{DateTime, Utc};
use convenient_metrics::{MetricsResult, MetricsRow, MetricsSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Latest poll outcome
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsBoard {
    /// Provers from the last successful poll
    pub provers: Vec<MetricsRow>,
    /// Time of the last successful poll
    pub updated_at: Option<DateTime<Utc>>,
    /// Error of the last poll, cleared by the next success
    pub last_error: Option<String>,
}

impl MetricsBoard {
    /// Whether any metrics have been fetched yet
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.provers.is_empty()
    }
}

/// Timer settings for the watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Interval between metric polls
    pub poll_interval: Duration,
    /// Interval between snapshot checks
    pub check_interval: Duration,
    /// Delay before the first snapshot check
    pub initial_check_delay: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            check_interval: Duration::from_secs(60),
            initial_check_delay: Duration::from_secs(5),
        }
    }
}

impl WatcherConfig {
    fn validate(&self) -> SnapshotResult<()> {
        if self.poll_interval.is_zero() || self.check_interval.is_zero() {
            return Err(SnapshotError::InvalidConfig(
                "poll and check intervals must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Owns the poll and snapshot-check timers
pub struct MetricsWatcher {
    source: Arc<dyn MetricsSource>,
    clock: Arc<dyn Clock>,
    config: WatcherConfig,

    /// Present while stopped; moved into the check task while running
    scheduler: Option<SnapshotScheduler>,

    board_tx: Arc<watch::Sender<MetricsBoard>>,
    shutdown_tx: Option<watch::Sender<bool>>,
    poll_handle: Option<JoinHandle<()>>,
    check_handle: Option<JoinHandle<SnapshotScheduler>>,
}

impl MetricsWatcher {
    /// Create a stopped watcher
    pub fn new(
        source: Arc<dyn MetricsSource>,
        scheduler: SnapshotScheduler,
        clock: Arc<dyn Clock>,
        config: WatcherConfig,
    ) -> Self {
        let (board_tx, _board_rx) = watch::channel(MetricsBoard::default());

        Self {
            source,
            clock,
            config,
            scheduler: Some(scheduler),
            board_tx: Arc::new(board_tx),
            shutdown_tx: None,
            poll_handle: None,
            check_handle: None,
        }
    }

    /// Start both timers; must be called from within a tokio runtime
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::AlreadyRunning` if the watcher is running
    /// Returns `SnapshotError::InvalidConfig` if an interval is zero
    /// Returns `SnapshotError::SchedulerUnavailable` if a previous run lost
    /// the scheduler
    pub fn start(&mut self) -> SnapshotResult<()> {
        if self.is_running() {
            return Err(SnapshotError::AlreadyRunning);
        }
        self.config.validate()?;
        let scheduler = self
            .scheduler
            .take()
            .ok_or(SnapshotError::SchedulerUnavailable)?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        self.poll_handle = Some(tokio::spawn(run_poller(
            Arc::clone(&self.source),
            Arc::clone(&self.clock),
            Arc::clone(&self.board_tx),
            self.config.poll_interval,
            shutdown_rx.clone(),
        )));
        self.check_handle = Some(tokio::spawn(run_checks(
            scheduler,
            Arc::clone(&self.clock),
            self.board_tx.subscribe(),
            self.config.clone(),
            shutdown_rx,
        )));
        self.shutdown_tx = Some(shutdown_tx);

        info!(
            poll_secs = self.config.poll_interval.as_secs(),
            check_secs = self.config.check_interval.as_secs(),
            "metrics watcher started"
        );
        Ok(())
    }

    /// Stop both timers and wait for them to finish
    ///
    /// Snapshot writes already handed off keep running in the background.
    /// Stopping a stopped watcher does nothing.
    pub async fn stop(&mut self) {
        let Some(shutdown_tx) = self.shutdown_tx.take() else {
            return;
        };
        // receivers are gone only if both tasks already ended
        let _ = shutdown_tx.send(true);

        if let Some(handle) = self.poll_handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "poll task join error");
            }
        }

        if let Some(handle) = self.check_handle.take() {
            match handle.await {
                Ok(scheduler) => self.scheduler = Some(scheduler),
                Err(e) => warn!(error = %e, "snapshot check task join error"),
            }
        }

        info!("metrics watcher stopped");
    }

    /// Whether the timers are running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    /// Receiver notified on every published board
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<MetricsBoard> {
        self.board_tx.subscribe()
    }

    /// Copy of the latest board
    #[must_use]
    pub fn board(&self) -> MetricsBoard {
        self.board_tx.borrow().clone()
    }

    /// The scheduler, available while stopped
    #[must_use]
    pub fn scheduler(&self) -> Option<&SnapshotScheduler> {
        self.scheduler.as_ref()
    }
}

async fn run_poller(
    source: Arc<dyn MetricsSource>,
    clock: Arc<dyn Clock>,
    board_tx: Arc<watch::Sender<MetricsBoard>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            _ = shutdown.changed() => break,
            result = source.fetch() => result,
        };
        publish(&board_tx, result, clock.now());
    }

    debug!("poll loop exited");
}

fn publish(
    board_tx: &watch::Sender<MetricsBoard>,
    result: MetricsResult<Vec<MetricsRow>>,
    now: DateTime<Utc>,
) {
    match result {
        Ok(provers) => {
            debug!(provers = provers.len(), "metrics refreshed");
            let _previous = board_tx.send_replace(MetricsBoard {
                provers,
                updated_at: Some(now),
                last_error: None,
            });
        }
        Err(e) => {
            warn!(error = %e, "metrics poll failed");
            board_tx.send_modify(|board| board.last_error = Some(e.to_string()));
        }
    }
}

async fn run_checks(
    mut scheduler: SnapshotScheduler,
    clock: Arc<dyn Clock>,
    board_rx: watch::Receiver<MetricsBoard>,
    config: WatcherConfig,
    mut shutdown: watch::Receiver<bool>,
) -> SnapshotScheduler {
    let mut ticker = time::interval_at(
        Instant::now() + config.initial_check_delay,
        config.check_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                let provers = board_rx.borrow().provers.clone();
                // persistence runs detached
                let _persist = scheduler.tick(clock.now(), &provers);
            }
        }
    }

    debug!("snapshot check loop exited");
    scheduler
}

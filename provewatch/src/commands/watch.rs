//! Watch command: poll metrics and record snapshots until interrupted

use crate::config::WatchArgs;
use crate::render;
use convenient_snapshot::{
    MetricsWatcher, SnapshotLog, SnapshotRecorder, SnapshotScheduler, SystemClock,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Run the watcher until Ctrl-C
pub async fn execute(args: &WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source = Arc::new(args.source.labelled_source()?);

    let sink = args.sink();
    if let Some(sink) = &sink {
        info!(url = %sink.url(), "forwarding snapshots to sink");
    }
    if args.no_persist {
        info!("snapshot log kept in memory only");
    } else {
        info!(path = %args.log.log_path.display(), "snapshot log");
    }

    let recorder = Arc::new(SnapshotRecorder::new(SnapshotLog::new(args.store()), sink));
    let mut scheduler = SnapshotScheduler::new(recorder);
    if args.resume {
        scheduler.resume_from_log().await;
    }

    let mut watcher = MetricsWatcher::new(
        source,
        scheduler,
        Arc::new(SystemClock),
        args.watcher_config(),
    );
    let mut updates = watcher.subscribe();
    watcher.start()?;
    info!(endpoint = %args.source.analytics_url, "watching prover metrics");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "failed to listen for Ctrl-C");
                }
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let board = updates.borrow_and_update().clone();
                println!("{}\n", render::board(&board));
            }
        }
    }

    info!("shutting down");
    watcher.stop().await;

    if let Some(bucket) = watcher.scheduler().and_then(SnapshotScheduler::last_bucket) {
        info!(bucket = %bucket, "last snapshot bucket this session");
    }

    Ok(())
}

//! Log command: list recorded snapshots

use crate::config::LogArgs;
use crate::render;
use convenient_snapshot::{Snapshot, SnapshotStore};

/// The newest `limit` snapshots, in their stored order
fn newest(snapshots: &[Snapshot], limit: Option<usize>) -> &[Snapshot] {
    let keep = limit.unwrap_or(snapshots.len());
    &snapshots[snapshots.len().saturating_sub(keep)..]
}

/// Print the snapshot log
pub async fn execute(
    log: &LogArgs,
    limit: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = log.store();
    let snapshots = store.load().await?;
    let shown = newest(&snapshots, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    if snapshots.is_empty() {
        println!("No snapshots recorded in {}", store.path().display());
        return Ok(());
    }

    println!("{}", render::snapshots(shown));
    println!(
        "\nShowing {} of {} snapshots from {}",
        shown.len(),
        snapshots.len(),
        store.path().display()
    );

    Ok(())
}

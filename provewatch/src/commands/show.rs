//! Show command: fetch the leaderboard once

use crate::config::SourceArgs;
use crate::render;
use convenient_metrics::aggregate;

/// Fetch, aggregate and print the current leaderboard
pub async fn execute(source: &SourceArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let client = source.client()?;
    let raw = client.fetch_rows().await?;
    tracing::debug!("Fetched {} raw rows from {}", raw.len(), client.endpoint());

    let provers = aggregate(&raw, &source.prover_labels());

    if json {
        println!("{}", serde_json::to_string_pretty(&provers)?);
    } else if provers.is_empty() {
        println!("No prover rows returned by {}", client.endpoint());
    } else {
        println!("{}", render::table(&provers));
    }

    Ok(())
}

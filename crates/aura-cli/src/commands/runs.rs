//! List recent ingest runs.

use crate::cli::{GlobalArgs, RunsArgs};
use crate::commands::common::{load_config, open_db};
use anyhow::{Context, Result};
use aura_meta::runlog::{self, IngestRun};

/// Execute the runs command.
pub(crate) fn execute(args: &RunsArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let db = open_db(&config, global)?;

    let runs = runlog::list_recent(&db, args.service.as_deref(), args.limit)?;

    if args.json {
        let output =
            serde_json::to_string_pretty(&runs).context("Failed to serialize runs as JSON")?;
        println!("{output}");
        return Ok(());
    }

    if runs.is_empty() {
        println!("No ingest runs recorded.");
        return Ok(());
    }

    println!(
        "{:>6}  {:<10} {:<10} {:<8} {:<19} {:>8} {:>8} {:>8}  {}",
        "run", "service", "source", "status", "started", "fetched", "insert", "update", "note"
    );
    for run in &runs {
        println!(
            "{:>6}  {:<10} {:<10} {:<8} {:<19} {:>8} {:>8} {:>8}  {}",
            run.run_id,
            run.service,
            run.source.as_deref().unwrap_or("-"),
            run.status,
            run.started_at_utc.format("%Y-%m-%d %H:%M:%S"),
            opt_count(run.rows_fetched),
            opt_count(run.rows_inserted),
            opt_count(run.rows_updated),
            note(run),
        );
    }
    Ok(())
}

fn opt_count(n: Option<i64>) -> String {
    n.map_or_else(|| "-".to_string(), |n| n.to_string())
}

/// Trailing column: the error for failed runs, the watermark otherwise.
fn note(run: &IngestRun) -> String {
    if let Some(error) = &run.error_message {
        return error.clone();
    }
    run.max_ts_utc
        .map(|ts| format!("watermark {}", ts.format("%Y-%m-%d %H:%M:%S")))
        .unwrap_or_default()
}

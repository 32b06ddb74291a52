//! Ingest run bookkeeping.
//!
//! Every ingestion job opens a run row at start and closes it exactly once
//! with a terminal status. The log is append-only apart from that single
//! guarded transition, so it serves both as an audit trail and as the
//! source of resumption watermarks. Nothing here retries: a store failure
//! surfaces immediately and the calling job decides what to do.

use crate::connection::AuraDb;
use crate::error::{MetaError, MetaResult};
use crate::row_helpers::{format_ts, parse_opt_ts, parse_ts};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

/// Lifecycle status of an ingest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Started,
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Started => "started",
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_status(raw: &str, run_id: i64) -> MetaResult<RunStatus> {
    match raw {
        "started" => Ok(RunStatus::Started),
        "success" => Ok(RunStatus::Success),
        "failed" => Ok(RunStatus::Failed),
        other => Err(MetaError::Persistence(format!(
            "unknown run status '{other}' for run {run_id}"
        ))),
    }
}

/// Handle to an open run, returned by [`start_run`].
#[derive(Debug, Clone, Copy)]
pub struct RunHandle {
    pub run_id: i64,
}

/// Result counts and watermark reported on successful completion.
#[derive(Debug, Clone, Default)]
pub struct RunTotals {
    pub rows_fetched: Option<i64>,
    pub rows_inserted: Option<i64>,
    pub rows_updated: Option<i64>,
    /// High-water mark of the ingested data, for incremental resumption.
    pub max_ts_utc: Option<DateTime<Utc>>,
}

/// One row of the run log.
#[derive(Debug, Clone, Serialize)]
pub struct IngestRun {
    pub run_id: i64,
    pub service: String,
    pub source: Option<String>,
    pub status: RunStatus,
    pub started_at_utc: DateTime<Utc>,
    pub finished_at_utc: Option<DateTime<Utc>>,
    pub rows_fetched: Option<i64>,
    pub rows_inserted: Option<i64>,
    pub rows_updated: Option<i64>,
    pub max_ts_utc: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

/// Open a run row with status `started`.
///
/// One durable write; never retried here.
pub fn start_run(db: &AuraDb, service: &str, source: Option<&str>) -> MetaResult<RunHandle> {
    let run_id: i64 = db
        .conn()
        .query_row(
            "INSERT INTO aura_meta.ingest_runs (service, source) VALUES (?, ?) RETURNING run_id",
            duckdb::params![service, source],
            |row| row.get(0),
        )
        .map_err(|e| MetaError::Persistence(format!("insert ingest_runs: {e}")))?;
    log::debug!("started ingest run {run_id} for service '{service}'");
    Ok(RunHandle { run_id })
}

/// Transition `handle` from started to success, recording counts and the
/// watermark.
///
/// Fails with [`MetaError::InvalidTransition`] if the run already reached a
/// terminal status.
pub fn complete_run(db: &AuraDb, handle: &RunHandle, totals: &RunTotals) -> MetaResult<()> {
    let max_ts = totals.max_ts_utc.as_ref().map(format_ts);
    let updated = db
        .conn()
        .execute(
            "UPDATE aura_meta.ingest_runs
             SET status = 'success', finished_at_utc = now(),
                 rows_fetched = ?, rows_inserted = ?, rows_updated = ?,
                 max_ts_utc = CAST(? AS TIMESTAMP)
             WHERE run_id = ? AND status = 'started'",
            duckdb::params![
                totals.rows_fetched,
                totals.rows_inserted,
                totals.rows_updated,
                max_ts,
                handle.run_id,
            ],
        )
        .map_err(|e| MetaError::Persistence(format!("update ingest_runs: {e}")))?;
    if updated == 0 {
        return Err(transition_refused(db, handle.run_id));
    }
    Ok(())
}

/// Transition `handle` from started to failed, recording the error message.
///
/// Counts and the watermark stay NULL. Same guard as [`complete_run`].
pub fn fail_run(db: &AuraDb, handle: &RunHandle, error_message: &str) -> MetaResult<()> {
    let updated = db
        .conn()
        .execute(
            "UPDATE aura_meta.ingest_runs
             SET status = 'failed', finished_at_utc = now(), error_message = ?
             WHERE run_id = ? AND status = 'started'",
            duckdb::params![error_message, handle.run_id],
        )
        .map_err(|e| MetaError::Persistence(format!("update ingest_runs: {e}")))?;
    if updated == 0 {
        return Err(transition_refused(db, handle.run_id));
    }
    Ok(())
}

/// Explain a refused terminal transition: the run is either already
/// terminal, or the handle points at a row that does not exist.
fn transition_refused(db: &AuraDb, run_id: i64) -> MetaError {
    let status = db.conn().query_row(
        "SELECT status FROM aura_meta.ingest_runs WHERE run_id = ?",
        duckdb::params![run_id],
        |row| row.get::<_, String>(0),
    );
    match status {
        Ok(status) => MetaError::InvalidTransition { run_id, status },
        Err(duckdb::Error::QueryReturnedNoRows) => MetaError::RunNotFound { run_id },
        Err(e) => MetaError::Persistence(format!("read ingest_runs status: {e}")),
    }
}

/// Watermark of the most recent success run for a (service, source) pair,
/// or `None` if the pair has never completed successfully.
///
/// `source` is matched with `IS NOT DISTINCT FROM` so a NULL-source pair
/// resolves against NULL-source runs only.
pub fn latest_watermark(
    db: &AuraDb,
    service: &str,
    source: Option<&str>,
) -> MetaResult<Option<DateTime<Utc>>> {
    let raw = db.conn().query_row(
        "SELECT CAST(max_ts_utc AS VARCHAR)
         FROM aura_meta.ingest_runs
         WHERE service = ? AND source IS NOT DISTINCT FROM ? AND status = 'success'
         ORDER BY run_id DESC
         LIMIT 1",
        duckdb::params![service, source],
        |row| row.get::<_, Option<String>>(0),
    );
    match raw {
        Ok(Some(raw)) => Ok(Some(parse_ts(&raw)?)),
        Ok(None) => Ok(None),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(MetaError::Persistence(format!(
            "query latest watermark: {e}"
        ))),
    }
}

/// Safe incremental resumption point for a (service, source) pair.
///
/// Watermark minus `lookback`, or `now - default_window` when the pair has
/// never completed successfully. The lookback re-covers late-arriving data
/// around the watermark boundary.
pub fn resume_after(
    db: &AuraDb,
    service: &str,
    source: Option<&str>,
    lookback: Duration,
    default_window: Duration,
) -> MetaResult<DateTime<Utc>> {
    match latest_watermark(db, service, source)? {
        Some(watermark) => Ok(watermark - lookback),
        None => Ok(Utc::now() - default_window),
    }
}

/// Newest-first slice of the run log, optionally filtered by service.
///
/// A NULL service filter matches every row: `service` is NOT NULL, so
/// `service = COALESCE(NULL, service)` always holds.
pub fn list_recent(
    db: &AuraDb,
    service: Option<&str>,
    limit: usize,
) -> MetaResult<Vec<IngestRun>> {
    let mut stmt = db
        .conn()
        .prepare(
            "SELECT run_id, service, source, status,
                    CAST(started_at_utc AS VARCHAR),
                    CAST(finished_at_utc AS VARCHAR),
                    rows_fetched, rows_inserted, rows_updated,
                    CAST(max_ts_utc AS VARCHAR),
                    error_message
             FROM aura_meta.ingest_runs
             WHERE service = COALESCE(?, service)
             ORDER BY run_id DESC
             LIMIT ?",
        )
        .map_err(|e| MetaError::Persistence(format!("prepare ingest_runs read: {e}")))?;

    type RawRun = (
        i64,
        String,
        Option<String>,
        String,
        String,
        Option<String>,
        Option<i64>,
        Option<i64>,
        Option<i64>,
        Option<String>,
        Option<String>,
    );
    let rows: Vec<RawRun> = stmt
        .query_map(duckdb::params![service, limit as i64], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
                row.get(9)?,
                row.get(10)?,
            ))
        })
        .map_err(|e| MetaError::Persistence(format!("query ingest_runs: {e}")))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| MetaError::Persistence(format!("read ingest_runs row: {e}")))?;

    rows.into_iter()
        .map(|raw| {
            let (
                run_id,
                service,
                source,
                status,
                started_at,
                finished_at,
                rows_fetched,
                rows_inserted,
                rows_updated,
                max_ts,
                error_message,
            ) = raw;
            Ok(IngestRun {
                run_id,
                service,
                source,
                status: parse_status(&status, run_id)?,
                started_at_utc: parse_ts(&started_at)?,
                finished_at_utc: parse_opt_ts(finished_at.as_deref())?,
                rows_fetched,
                rows_inserted,
                rows_updated,
                max_ts_utc: parse_opt_ts(max_ts.as_deref())?,
                error_message,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "runlog_test.rs"]
mod tests;

//! Tests for the ingest run lifecycle and watermark queries.

use super::*;
use chrono::TimeZone;

// ── Helpers ────────────────────────────────────────────────────────────

fn db() -> AuraDb {
    AuraDb::open_memory().unwrap()
}

fn ts(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, h, m, s).unwrap()
}

fn totals_with_watermark(watermark: DateTime<Utc>) -> RunTotals {
    RunTotals {
        rows_fetched: Some(100),
        rows_inserted: Some(95),
        rows_updated: Some(5),
        max_ts_utc: Some(watermark),
    }
}

fn row(db: &AuraDb, run_id: i64) -> IngestRun {
    list_recent(db, None, 100)
        .unwrap()
        .into_iter()
        .find(|r| r.run_id == run_id)
        .expect("run row should exist")
}

// ── Lifecycle ──────────────────────────────────────────────────────────

#[test]
fn start_run_opens_a_started_row() {
    let db = db();
    let handle = start_run(&db, "weather", Some("noaa")).unwrap();

    let run = row(&db, handle.run_id);
    assert_eq!(run.service, "weather");
    assert_eq!(run.source.as_deref(), Some("noaa"));
    assert_eq!(run.status, RunStatus::Started);
    assert!(run.finished_at_utc.is_none());
    assert!(run.rows_fetched.is_none());
    assert!(run.error_message.is_none());
}

#[test]
fn run_ids_are_monotonic() {
    let db = db();
    let first = start_run(&db, "weather", None).unwrap();
    let second = start_run(&db, "weather", None).unwrap();
    assert!(second.run_id > first.run_id);
}

#[test]
fn complete_run_records_counts_and_watermark() {
    let db = db();
    let handle = start_run(&db, "weather", Some("noaa")).unwrap();
    let watermark = ts(12, 0, 0);
    complete_run(&db, &handle, &totals_with_watermark(watermark)).unwrap();

    let run = row(&db, handle.run_id);
    assert_eq!(run.status, RunStatus::Success);
    assert!(run.finished_at_utc.is_some());
    assert_eq!(run.rows_fetched, Some(100));
    assert_eq!(run.rows_inserted, Some(95));
    assert_eq!(run.rows_updated, Some(5));
    assert_eq!(run.max_ts_utc, Some(watermark));
    assert!(run.error_message.is_none());
}

#[test]
fn complete_run_twice_is_an_invalid_transition() {
    let db = db();
    let handle = start_run(&db, "weather", Some("noaa")).unwrap();
    complete_run(&db, &handle, &totals_with_watermark(ts(12, 0, 0))).unwrap();

    let result = complete_run(&db, &handle, &totals_with_watermark(ts(13, 0, 0)));
    match result {
        Err(MetaError::InvalidTransition { run_id, status }) => {
            assert_eq!(run_id, handle.run_id);
            assert_eq!(status, "success");
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
}

#[test]
fn fail_run_records_error_and_leaves_counts_null() {
    let db = db();
    let handle = start_run(&db, "weather", Some("noaa")).unwrap();
    fail_run(&db, &handle, "timeout").unwrap();

    let run = row(&db, handle.run_id);
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.finished_at_utc.is_some());
    assert_eq!(run.error_message.as_deref(), Some("timeout"));
    assert!(run.rows_fetched.is_none());
    assert!(run.rows_inserted.is_none());
    assert!(run.rows_updated.is_none());
    assert!(run.max_ts_utc.is_none());
}

#[test]
fn complete_after_fail_is_an_invalid_transition() {
    let db = db();
    let handle = start_run(&db, "weather", None).unwrap();
    fail_run(&db, &handle, "timeout").unwrap();

    let result = complete_run(&db, &handle, &RunTotals::default());
    assert!(matches!(
        result,
        Err(MetaError::InvalidTransition { status, .. }) if status == "failed"
    ));
}

#[test]
fn unknown_run_id_is_reported_as_not_found() {
    let db = db();
    let stale = RunHandle { run_id: 4242 };
    let result = fail_run(&db, &stale, "whatever");
    assert!(matches!(
        result,
        Err(MetaError::RunNotFound { run_id: 4242 })
    ));
}

// ── Watermarks ─────────────────────────────────────────────────────────

#[test]
fn watermark_is_none_without_a_success_run() {
    let db = db();
    assert!(latest_watermark(&db, "weather", Some("noaa"))
        .unwrap()
        .is_none());

    // A started and a failed run still don't produce a watermark.
    let _open = start_run(&db, "weather", Some("noaa")).unwrap();
    let failed = start_run(&db, "weather", Some("noaa")).unwrap();
    fail_run(&db, &failed, "timeout").unwrap();
    assert!(latest_watermark(&db, "weather", Some("noaa"))
        .unwrap()
        .is_none());
}

#[test]
fn watermark_comes_from_most_recent_success() {
    let db = db();
    let first = start_run(&db, "weather", Some("noaa")).unwrap();
    complete_run(&db, &first, &totals_with_watermark(ts(10, 0, 0))).unwrap();
    let second = start_run(&db, "weather", Some("noaa")).unwrap();
    complete_run(&db, &second, &totals_with_watermark(ts(11, 30, 0))).unwrap();

    // A later failure doesn't mask the success.
    let third = start_run(&db, "weather", Some("noaa")).unwrap();
    fail_run(&db, &third, "rate limited").unwrap();

    assert_eq!(
        latest_watermark(&db, "weather", Some("noaa")).unwrap(),
        Some(ts(11, 30, 0))
    );
}

#[test]
fn watermark_reads_the_latest_success_even_when_unset() {
    // The contract is "the most recent success run's watermark", so a
    // success that reported no watermark yields None.
    let db = db();
    let first = start_run(&db, "weather", Some("noaa")).unwrap();
    complete_run(&db, &first, &totals_with_watermark(ts(10, 0, 0))).unwrap();
    let second = start_run(&db, "weather", Some("noaa")).unwrap();
    complete_run(&db, &second, &RunTotals::default()).unwrap();

    assert!(latest_watermark(&db, "weather", Some("noaa"))
        .unwrap()
        .is_none());
}

#[test]
fn watermark_discriminates_service_and_source() {
    let db = db();
    let noaa = start_run(&db, "weather", Some("noaa")).unwrap();
    complete_run(&db, &noaa, &totals_with_watermark(ts(10, 0, 0))).unwrap();
    let unsourced = start_run(&db, "weather", None).unwrap();
    complete_run(&db, &unsourced, &totals_with_watermark(ts(11, 0, 0))).unwrap();

    assert_eq!(
        latest_watermark(&db, "weather", Some("noaa")).unwrap(),
        Some(ts(10, 0, 0))
    );
    assert_eq!(
        latest_watermark(&db, "weather", None).unwrap(),
        Some(ts(11, 0, 0))
    );
    assert!(latest_watermark(&db, "strava", None).unwrap().is_none());
}

#[test]
fn resume_after_subtracts_lookback_from_watermark() {
    let db = db();
    let handle = start_run(&db, "strava", None).unwrap();
    complete_run(&db, &handle, &totals_with_watermark(ts(12, 0, 0))).unwrap();

    let point = resume_after(
        &db,
        "strava",
        None,
        Duration::hours(6),
        Duration::days(30),
    )
    .unwrap();
    assert_eq!(point, ts(6, 0, 0));
}

#[test]
fn resume_after_falls_back_to_default_window() {
    let db = db();
    let before = Utc::now() - Duration::days(30);
    let point = resume_after(
        &db,
        "strava",
        None,
        Duration::hours(6),
        Duration::days(30),
    )
    .unwrap();
    let after = Utc::now() - Duration::days(30);
    assert!(point >= before && point <= after);
}

// ── Listing ────────────────────────────────────────────────────────────

#[test]
fn list_recent_is_newest_first_with_limit_and_filter() {
    let db = db();
    for i in 0..3 {
        let handle = start_run(&db, "weather", None).unwrap();
        complete_run(
            &db,
            &handle,
            &RunTotals {
                rows_fetched: Some(i),
                ..RunTotals::default()
            },
        )
        .unwrap();
    }
    let strava = start_run(&db, "strava", None).unwrap();
    fail_run(&db, &strava, "timeout").unwrap();

    let all = list_recent(&db, None, 10).unwrap();
    assert_eq!(all.len(), 4);
    assert!(all.windows(2).all(|w| w[0].run_id > w[1].run_id));

    let weather = list_recent(&db, Some("weather"), 2).unwrap();
    assert_eq!(weather.len(), 2);
    assert!(weather.iter().all(|r| r.service == "weather"));
    assert_eq!(weather[0].rows_fetched, Some(2));
}

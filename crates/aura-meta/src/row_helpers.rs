//! Shared helpers for moving timestamps across the SQL boundary.
//!
//! Timestamps are written by the store (`now()`) or passed in as text and
//! `CAST` to TIMESTAMP; reads go through `CAST(... AS VARCHAR)`. DuckDB
//! renders a VARCHAR-cast timestamp as `YYYY-MM-DD HH:MM:SS[.ffffff]`.

use crate::error::{MetaError, MetaResult};
use chrono::{DateTime, NaiveDateTime, Utc};

const TS_READ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const TS_WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Parse a DuckDB VARCHAR-rendered timestamp as UTC.
pub(crate) fn parse_ts(raw: &str) -> MetaResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TS_READ_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| MetaError::Persistence(format!("unparseable timestamp '{raw}': {e}")))
}

/// Parse an optional VARCHAR-rendered timestamp column.
pub(crate) fn parse_opt_ts(raw: Option<&str>) -> MetaResult<Option<DateTime<Utc>>> {
    raw.map(parse_ts).transpose()
}

/// Render a UTC timestamp in the form DuckDB accepts for a TIMESTAMP cast.
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.naive_utc().format(TS_WRITE_FORMAT).to_string()
}

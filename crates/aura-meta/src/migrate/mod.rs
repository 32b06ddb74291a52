//! Schema migration runner.
//!
//! Brings the database to the latest known version by applying each pending
//! migration file exactly once, in version order. The pending set is derived
//! purely from the difference between the files on disk and the rows in
//! `aura_meta.schema_migrations`; there is no cached "current version"
//! anywhere. Each migration's statements and its record commit in one
//! transaction, so a failed migration leaves no trace.

pub mod loader;

use crate::connection::AuraDb;
use crate::error::{MetaError, MetaResult};
use crate::row_helpers::parse_ts;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

pub use loader::{load_dir, load_dirs, MigrationFile};

/// A migration recorded as applied in `aura_meta.schema_migrations`.
#[derive(Debug, Clone)]
pub struct AppliedMigration {
    pub version: i32,
    pub name: String,
    pub checksum: String,
    pub applied_at: DateTime<Utc>,
}

/// Read the applied-migration records, ordered by version ascending.
pub fn applied_records(db: &AuraDb) -> MetaResult<Vec<AppliedMigration>> {
    let mut stmt = db
        .conn()
        .prepare(
            "SELECT version, name, checksum, CAST(applied_at AS VARCHAR)
             FROM aura_meta.schema_migrations
             ORDER BY version",
        )
        .map_err(|e| MetaError::Persistence(format!("prepare schema_migrations read: {e}")))?;

    let rows: Vec<(i32, String, String, String)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })
        .map_err(|e| MetaError::Persistence(format!("query schema_migrations: {e}")))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| MetaError::Persistence(format!("read schema_migrations row: {e}")))?;

    rows.into_iter()
        .map(|(version, name, checksum, applied_at)| {
            Ok(AppliedMigration {
                version,
                name,
                checksum,
                applied_at: parse_ts(&applied_at)?,
            })
        })
        .collect()
}

/// Compute the ordered set of migrations not yet applied.
///
/// Fails fast before anything touches the database:
/// - [`MetaError::Drift`] when an applied version's stored checksum differs
///   from the current file content
/// - [`MetaError::MissingApplied`] when an applied version has no file
/// - [`MetaError::SequenceGap`] when an unapplied version is ordered before
///   the highest applied version
///
/// Never skips, never reorders.
pub fn plan<'a>(
    available: &'a [MigrationFile],
    applied: &[AppliedMigration],
) -> MetaResult<Vec<&'a MigrationFile>> {
    for record in applied {
        match available.iter().find(|f| f.version == record.version) {
            Some(file) if file.checksum != record.checksum => {
                return Err(MetaError::Drift {
                    version: record.version,
                    recorded: record.checksum.clone(),
                    current: file.checksum.clone(),
                });
            }
            Some(_) => {}
            None => {
                return Err(MetaError::MissingApplied {
                    version: record.version,
                });
            }
        }
    }

    let pending: Vec<&MigrationFile> = available
        .iter()
        .filter(|f| applied.iter().all(|r| r.version != f.version))
        .collect();

    if let Some(highest_applied) = applied.iter().map(|r| r.version).max() {
        if let Some(out_of_order) = pending.iter().find(|f| f.version < highest_applied) {
            return Err(MetaError::SequenceGap {
                version: out_of_order.version,
                highest_applied,
            });
        }
    }

    Ok(pending)
}

/// Apply one migration inside a single transaction.
///
/// The migration's statements and its `schema_migrations` record commit
/// atomically; any statement failure rolls back both and surfaces as
/// [`MetaError::Migration`].
pub fn apply(db: &AuraDb, migration: &MigrationFile) -> MetaResult<()> {
    log::debug!(
        "applying migration v{:03} ({})",
        migration.version,
        migration.name
    );
    db.transaction(|conn| {
        conn.execute_batch(&migration.sql)
            .map_err(|e| MetaError::Migration {
                version: migration.version,
                cause: e.to_string(),
            })?;
        conn.execute(
            "INSERT INTO aura_meta.schema_migrations (version, name, checksum) VALUES (?, ?, ?)",
            duckdb::params![migration.version, migration.name, migration.checksum],
        )
        .map_err(|e| MetaError::Migration {
            version: migration.version,
            cause: format!("failed to record migration: {e}"),
        })?;
        Ok(())
    })
}

/// A migration applied by a [`run`] invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub version: i32,
    pub name: String,
}

/// The first failure of a [`run`] invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ReportFailure {
    pub version: i32,
    pub cause: String,
}

/// Outcome of a [`run`] invocation, suitable for logs or CI output.
#[derive(Debug, Serialize)]
pub struct Report {
    /// Migrations applied by this invocation, in order.
    pub applied: Vec<ReportEntry>,
    /// Pending migrations left unapplied (nonzero only after a failure).
    pub remaining: usize,
    /// Version and cause of the failure that halted the run, if any.
    pub failed: Option<ReportFailure>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.applied.is_empty() && self.failed.is_none() {
            writeln!(f, "Nothing to apply; schema is up to date.")?;
        }
        for entry in &self.applied {
            writeln!(f, "applied  v{:03} {}", entry.version, entry.name)?;
        }
        if let Some(failure) = &self.failed {
            writeln!(f, "FAILED   v{:03}: {}", failure.version, failure.cause)?;
            writeln!(f, "{} migration(s) left unapplied.", self.remaining)?;
        }
        Ok(())
    }
}

/// Load, plan, and apply all pending migrations from `dirs`, strictly in
/// order, stopping at the first failure.
///
/// Plan-stage violations (drift, gaps, bad filenames) surface as errors
/// because nothing was attempted; a failed apply is captured in the report
/// so the migrations already applied by this invocation stay visible.
/// Running twice in succession is a no-op the second time.
pub fn run(db: &AuraDb, dirs: &[PathBuf]) -> MetaResult<Report> {
    let available = loader::load_dirs(dirs)?;
    let applied = applied_records(db)?;
    let pending = plan(&available, &applied)?;
    log::info!("{} migration(s) pending", pending.len());

    let mut report = Report {
        applied: Vec::new(),
        remaining: pending.len(),
        failed: None,
    };
    for migration in pending {
        match apply(db, migration) {
            Ok(()) => {
                report.applied.push(ReportEntry {
                    version: migration.version,
                    name: migration.name.clone(),
                });
                report.remaining -= 1;
            }
            Err(MetaError::Migration { version, cause }) => {
                report.failed = Some(ReportFailure { version, cause });
                break;
            }
            Err(other) => return Err(other),
        }
    }
    Ok(report)
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;

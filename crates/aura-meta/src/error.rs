//! Error types for the bookkeeping database.

use thiserror::Error;

/// Bookkeeping database errors.
#[derive(Error, Debug)]
pub enum MetaError {
    /// Failed to open or create the bookkeeping database (M001).
    #[error("[M001] Bookkeeping database connection failed: {0}")]
    Connection(String),

    /// A migration file name does not follow `NNN_description.sql` (M002).
    #[error("[M002] Invalid migration filename: {path}")]
    InvalidFilename { path: String },

    /// Two migration files share the same version number (M003).
    #[error("[M003] Duplicate migration version {version}: '{first}' and '{second}'")]
    DuplicateVersion {
        version: i32,
        first: String,
        second: String,
    },

    /// An unapplied migration is ordered before an already-applied one (M004).
    #[error("[M004] Migration sequence gap: version {version} is unapplied but version {highest_applied} has already been applied")]
    SequenceGap { version: i32, highest_applied: i32 },

    /// An applied migration's file content changed after application (M005).
    #[error("[M005] Migration drift in version {version}: recorded checksum {recorded} does not match current file checksum {current}")]
    Drift {
        version: i32,
        recorded: String,
        current: String,
    },

    /// An applied migration has no corresponding file on disk (M006).
    #[error("[M006] Applied migration {version} has no file in the migration directory")]
    MissingApplied { version: i32 },

    /// A migration's statements failed; the transaction was rolled back (M007).
    #[error("[M007] Migration {version} failed: {cause}")]
    Migration { version: i32, cause: String },

    /// A run-status transition was attempted from a non-started state (M008).
    #[error("[M008] Invalid run transition: run {run_id} is '{status}', expected 'started'")]
    InvalidTransition { run_id: i64, status: String },

    /// A run id does not exist in the run log (M009).
    #[error("[M009] Ingest run {run_id} not found")]
    RunNotFound { run_id: i64 },

    /// IO error with file path context (M010).
    #[error("[M010] Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The store rejected a read or write (M011).
    #[error("[M011] Bookkeeping store error: {0}")]
    Persistence(String),

    /// Transaction management error (M012).
    #[error("[M012] Bookkeeping transaction failed: {0}")]
    Transaction(String),

    /// DuckDB driver error with preserved source chain (M013).
    #[error("[M013] DuckDB error")]
    DuckDb(#[source] duckdb::Error),
}

/// Result type alias for [`MetaError`].
pub type MetaResult<T> = Result<T, MetaError>;

impl From<duckdb::Error> for MetaError {
    fn from(err: duckdb::Error) -> Self {
        MetaError::DuckDb(err)
    }
}

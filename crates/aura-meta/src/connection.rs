//! Bookkeeping database connection wrapper.
//!
//! [`AuraDb`] owns a DuckDB [`Connection`] and provides helpers for opening
//! the database, bootstrapping the `aura_meta` schema, and transacting.

use crate::ddl::BOOKKEEPING_DDL;
use crate::error::{MetaError, MetaResult};
use duckdb::Connection;
use std::path::Path;

/// Wrapper around a DuckDB connection to the Aura database.
///
/// Single-threaded; migration runs and per-job bookkeeping calls are
/// sequential on their own connection.
pub struct AuraDb {
    conn: Connection,
}

impl AuraDb {
    /// Open (or create) the database at `path` and bootstrap the
    /// `aura_meta` bookkeeping tables.
    pub fn open(path: &Path) -> MetaResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| MetaError::Connection(format!("{e}: {}", path.display())))?;
        ensure_bookkeeping(&conn)?;
        Ok(Self { conn })
    }

    /// Create an in-memory database with the bookkeeping tables in place.
    ///
    /// Useful for unit tests that don't need persistence.
    pub fn open_memory() -> MetaResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| MetaError::Connection(e.to_string()))?;
        ensure_bookkeeping(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying DuckDB connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back
    /// on error.
    pub fn transaction<F, T>(&self, body: F) -> MetaResult<T>
    where
        F: FnOnce(&Connection) -> MetaResult<T>,
    {
        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| MetaError::Transaction(format!("BEGIN failed: {e}")))?;

        let result = body(&self.conn);

        match &result {
            Ok(_) => {
                if let Err(commit_err) = self.conn.execute_batch("COMMIT") {
                    let _ = self.conn.execute_batch("ROLLBACK");
                    return Err(MetaError::Transaction(format!("COMMIT failed: {commit_err}")));
                }
            }
            Err(_) => {
                let _ = self.conn.execute_batch("ROLLBACK");
            }
        }
        result
    }
}

/// Create the `aura_meta` schema and its two tables if missing.
fn ensure_bookkeeping(conn: &Connection) -> MetaResult<()> {
    conn.execute_batch(BOOKKEEPING_DDL)
        .map_err(|e| MetaError::Connection(format!("failed to create aura_meta tables: {e}")))
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;

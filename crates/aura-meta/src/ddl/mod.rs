//! Embedded DDL for the `aura_meta` bookkeeping schema.
//!
//! The bookkeeping tables are a fixed contract rather than a moving schema,
//! so they ship as a single idempotent `.sql` file embedded via
//! `include_str!` and executed on every [`crate::AuraDb`] open. Domain
//! schemas are created by migration files, never here.

/// Idempotent bookkeeping DDL, applied at connection open.
pub static BOOKKEEPING_DDL: &str = include_str!("bookkeeping.sql");

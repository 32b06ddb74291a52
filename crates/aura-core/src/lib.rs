//! aura-core - Core library for Aura
//!
//! This crate provides the shared pieces used across the Aura bookkeeping
//! components: project configuration parsing (`aura.yml`), the SHA-256
//! checksum used for migration drift detection, and the core error types.

pub mod checksum;
pub mod config;
pub mod error;

pub use checksum::compute_checksum;
pub use config::{Config, DatabaseConfig};
pub use error::{CoreError, CoreResult};

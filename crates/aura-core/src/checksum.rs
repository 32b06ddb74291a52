//! SHA-256 checksum utility for migration drift detection.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 checksum of a string as lowercase hex.
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}

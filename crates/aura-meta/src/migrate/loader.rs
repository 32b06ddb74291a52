//! Migration file discovery.
//!
//! Each migration is a `.sql` file named `NNN_description.sql`. The numeric
//! prefix is the version token; ordering comes from the parsed number, never
//! from directory listing order. Non-`.sql` files are ignored so a README
//! can live alongside the migrations.

use crate::error::{MetaError, MetaResult};
use aura_core::compute_checksum;
use std::path::{Path, PathBuf};

/// A migration file loaded from disk.
#[derive(Debug, Clone)]
pub struct MigrationFile {
    /// Version token parsed from the filename prefix.
    pub version: i32,
    /// Description part of the filename, without prefix and extension.
    pub name: String,
    /// Full SQL content.
    pub sql: String,
    /// SHA-256 checksum of the content.
    pub checksum: String,
}

/// Parse an `NNN_description` file stem into (version, name).
fn parse_stem(stem: &str) -> Option<(i32, String)> {
    let (prefix, rest) = stem.split_once('_')?;
    if prefix.is_empty() || rest.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let version = prefix.parse::<i32>().ok()?;
    Some((version, rest.to_string()))
}

/// Load all migration files from `dirs`, sorted by version ascending.
///
/// Fails on a filename that doesn't carry a version prefix and on two files
/// claiming the same version (also across directories).
pub fn load_dirs(dirs: &[PathBuf]) -> MetaResult<Vec<MigrationFile>> {
    let mut files = Vec::new();
    for dir in dirs {
        let entries = std::fs::read_dir(dir).map_err(|e| MetaError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| MetaError::Io {
                path: dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("sql") {
                continue;
            }
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            let Some((version, name)) = parse_stem(stem) else {
                return Err(MetaError::InvalidFilename {
                    path: path.display().to_string(),
                });
            };
            let sql = std::fs::read_to_string(&path).map_err(|e| MetaError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
            let checksum = compute_checksum(&sql);
            files.push(MigrationFile {
                version,
                name,
                sql,
                checksum,
            });
        }
    }

    files.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.name.cmp(&b.name)));
    for pair in files.windows(2) {
        if pair[0].version == pair[1].version {
            return Err(MetaError::DuplicateVersion {
                version: pair[0].version,
                first: pair[0].name.clone(),
                second: pair[1].name.clone(),
            });
        }
    }
    Ok(files)
}

/// Load all migration files from a single directory.
pub fn load_dir(dir: &Path) -> MetaResult<Vec<MigrationFile>> {
    load_dirs(&[dir.to_path_buf()])
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;

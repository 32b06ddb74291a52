//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use aura_core::Config;
use aura_meta::AuraDb;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Load the project config honoring `--project-dir` and `--config`.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    match &global.config {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("Failed to load config from {path}")),
        None => Config::load_from_dir(Path::new(&global.project_dir))
            .context("Failed to load project config (aura.yml)"),
    }
}

/// Resolve a configured path against the project directory.
fn resolve(global: &GlobalArgs, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(&global.project_dir).join(path)
    }
}

/// Open the bookkeeping database named by the config.
pub(crate) fn open_db(config: &Config, global: &GlobalArgs) -> Result<AuraDb> {
    if config.database.is_memory() {
        anyhow::bail!(
            "database.path is \":memory:\"; the CLI needs a persistent database file in aura.yml"
        );
    }
    let path = resolve(global, &config.database.path);
    AuraDb::open(&path).with_context(|| format!("Failed to open database at {}", path.display()))
}

/// Resolve the configured migration directories against the project dir.
pub(crate) fn migration_dirs(config: &Config, global: &GlobalArgs) -> Vec<PathBuf> {
    config
        .migration_paths
        .iter()
        .map(|p| resolve(global, p))
        .collect()
}

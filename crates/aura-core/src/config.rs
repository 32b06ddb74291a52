//! Configuration types and parsing for aura.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main project configuration from aura.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Directories containing migration SQL files
    #[serde(default = "default_migration_paths")]
    pub migration_paths: Vec<String>,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path to the DuckDB database file, or ":memory:"
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the configured database is in-memory.
    pub fn is_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

fn default_version() -> String {
    "1.0.0".to_string()
}

const DEFAULT_DB_PATH: &str = "aura.duckdb";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_migration_paths() -> Vec<String> {
    vec!["migrations".to_string()]
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        log::debug!("loaded config for project '{}'", config.name);
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for aura.yml or aura.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("aura.yml");
        let yaml_path = dir.join("aura.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: dir.join("aura.yml").display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.migration_paths.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one migration_paths entry must be specified".to_string(),
            });
        }

        if self.database.path.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

//! Show applied and pending migrations.

use crate::cli::GlobalArgs;
use crate::commands::common::{load_config, migration_dirs, open_db};
use anyhow::Result;
use aura_meta::migrate;

/// Execute the status command.
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let db = open_db(&config, global)?;
    let dirs = migration_dirs(&config, global);

    let available = migrate::load_dirs(&dirs)?;
    let applied = migrate::applied_records(&db)?;

    if applied.is_empty() {
        println!("No migrations applied yet.");
    } else {
        println!("Applied:");
        for record in &applied {
            if global.verbose {
                println!(
                    "  v{:03} {:<30} {}  {}",
                    record.version,
                    record.name,
                    record.applied_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    record.checksum
                );
            } else {
                println!(
                    "  v{:03} {:<30} {}",
                    record.version,
                    record.name,
                    record.applied_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
        }
    }

    let pending = migrate::plan(&available, &applied)?;
    if pending.is_empty() {
        println!("Schema is up to date.");
    } else {
        println!("Pending:");
        for migration in pending {
            println!("  v{:03} {}", migration.version, migration.name);
        }
    }
    Ok(())
}

//! Apply pending schema migrations.

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{load_config, migration_dirs, open_db};
use anyhow::Result;
use aura_meta::migrate;

/// Execute the migrate command.
pub(crate) fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let db = open_db(&config, global)?;
    let dirs = migration_dirs(&config, global);

    if args.dry_run {
        let available = migrate::load_dirs(&dirs)?;
        let applied = migrate::applied_records(&db)?;
        let pending = migrate::plan(&available, &applied)?;
        if pending.is_empty() {
            println!("Nothing to apply; schema is up to date.");
        } else {
            println!("Pending migrations:");
            for migration in pending {
                println!("  v{:03} {}", migration.version, migration.name);
            }
        }
        return Ok(());
    }

    let report = migrate::run(&db, &dirs)?;
    print!("{report}");
    if let Some(failure) = &report.failed {
        anyhow::bail!(
            "migration v{:03} halted the run: {}",
            failure.version,
            failure.cause
        );
    }
    Ok(())
}

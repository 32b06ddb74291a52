//! Show the latest ingest watermark for a service.

use crate::cli::{GlobalArgs, WatermarkArgs};
use crate::commands::common::{load_config, open_db};
use anyhow::Result;
use aura_meta::runlog;

/// Execute the watermark command.
pub(crate) fn execute(args: &WatermarkArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let db = open_db(&config, global)?;

    match runlog::latest_watermark(&db, &args.service, args.source.as_deref())? {
        Some(watermark) => println!("{}", watermark.to_rfc3339()),
        None => println!("none"),
    }
    Ok(())
}

//! Aura CLI - schema migration and ingest-run bookkeeping for the Aura
//! data platform

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{migrate, runs, status, watermark};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        cli::Commands::Migrate(args) => migrate::execute(args, &cli.global),
        cli::Commands::Status => status::execute(&cli.global),
        cli::Commands::Runs(args) => runs::execute(args, &cli.global),
        cli::Commands::Watermark(args) => watermark::execute(args, &cli.global),
    }
}

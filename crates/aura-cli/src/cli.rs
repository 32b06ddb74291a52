//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// Aura - bookkeeping CLI for the Aura data platform
#[derive(Parser, Debug)]
#[command(name = "aura")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending schema migrations
    Migrate(MigrateArgs),

    /// Show applied and pending migrations
    Status,

    /// List recent ingest runs
    Runs(RunsArgs),

    /// Show the latest ingest watermark for a service
    Watermark(WatermarkArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Print the pending plan without applying anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the runs command
#[derive(Args, Debug)]
pub struct RunsArgs {
    /// Filter by service name
    #[arg(short, long)]
    pub service: Option<String>,

    /// Maximum number of runs to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the watermark command
#[derive(Args, Debug)]
pub struct WatermarkArgs {
    /// Service name
    #[arg(short, long)]
    pub service: String,

    /// Source identifier within the service
    #[arg(long)]
    pub source: Option<String>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

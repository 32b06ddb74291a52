use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn watermark_requires_service() {
    let result = Cli::try_parse_from(["aura", "watermark"]);
    assert!(result.is_err());
}

#[test]
fn runs_defaults() {
    let cli = Cli::try_parse_from(["aura", "runs"]).unwrap();
    match cli.command {
        Commands::Runs(args) => {
            assert_eq!(args.limit, 20);
            assert!(args.service.is_none());
            assert!(!args.json);
        }
        other => panic!("expected runs command, got {other:?}"),
    }
}

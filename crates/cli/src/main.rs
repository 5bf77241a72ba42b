//! Iris TestRail CLI - Main Entry Point
//!
//! Reports completed Iris test sessions to TestRail and inspects the
//! projects, runs and tests already recorded there.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

use commands::{query, report, ConnectionArgs};

/// Iris TestRail reporter
#[derive(Parser)]
#[command(name = "iris-testrail")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (default: ~/.iris/testrail.toml)
    #[arg(long, env = "IRIS_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a test plan and post the results of a completed run
    Report(report::ReportArgs),

    /// List projects
    Projects,

    /// List the runs of the configured project
    Runs,

    /// List the tests of a run
    Tests(query::TestsArgs),

    /// Print the plan name and description for a build
    PlanName(report::PlanNameArgs),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::PlanName(args) => report::plan_name_command(args),
        Commands::Version => {
            println!("Iris TestRail reporter v{}", iris_common::VERSION);
        }
        command => {
            let config = commands::resolve_config(cli.config.as_deref(), &cli.connection)?;
            let result = match command {
                Commands::Report(args) => report::execute(args, &config, cli.format).await,
                Commands::Projects => query::projects(&config, cli.format).await,
                Commands::Runs => query::runs(&config, cli.format).await,
                Commands::Tests(args) => query::tests(args, &config, cli.format).await,
                Commands::PlanName(_) | Commands::Version => Ok(()),
            };
            if let Err(e) = result {
                output::print_error(&format!("{:#}", e));
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_report_command() {
        let cli = Cli::try_parse_from([
            "iris-testrail",
            "--format",
            "json",
            "report",
            "--results",
            "run.json",
            "--fx-version",
            "61.0.3",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.results, PathBuf::from("run.json"));
                assert_eq!(args.fx_version.as_deref(), Some("61.0.3"));
                assert!(args.build_id.is_none());
                assert!(args.dry_run);
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn test_parse_tests_command() {
        let cli = Cli::try_parse_from(["iris-testrail", "tests", "--run", "Bookmarks"]).unwrap();
        assert!(matches!(cli.command, Commands::Tests(ref args) if args.run == "Bookmarks"));
    }
}

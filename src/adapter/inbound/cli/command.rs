//! Command-line interface definitions.
//!
//! Defines the CLI structure for the procmine binary using `clap`. One
//! binary serves every role: the container entrypoint, the API server, the
//! dashboard, and the offline data and model commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Process-mining API, dashboard and deployment tooling
#[derive(Parser, Debug)]
#[command(name = "procmine")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the procmine CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Wait for the database, migrate, then exec the given command
    Entrypoint(EntrypointArgs),

    /// Wait for the database and apply migrations, without launching anything
    Migrate(MigrateArgs),

    /// Run the REST API server
    Serve,

    /// Run the dashboard service
    Dashboard,

    /// Import an event log CSV into the database
    LoadEvents(LoadEventsArgs),

    /// Write a synthetic issue-tracker event log
    Generate(GenerateArgs),

    /// Train the duration and reopen-risk models from the database
    Train,

    /// Probe a service's /health endpoint
    Check(CheckArgs),

    /// Print cycle-time and bottleneck metrics
    Report,
}

/// Arguments for the `entrypoint` subcommand.
#[derive(Parser, Debug)]
pub struct EntrypointArgs {
    /// Shell command migrating a networked database (overrides MIGRATE_COMMAND).
    #[arg(long)]
    pub migrate_command: Option<String>,

    /// Server command to exec once setup succeeds, given after `--`.
    #[arg(last = true)]
    pub command: Vec<String>,
}

/// Arguments for the `migrate` subcommand.
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Shell command migrating a networked database (overrides MIGRATE_COMMAND).
    #[arg(long)]
    pub migrate_command: Option<String>,
}

/// Arguments for the `load-events` subcommand.
#[derive(Parser, Debug)]
pub struct LoadEventsArgs {
    /// CSV file with case_id, activity, timestamp and optional resource columns.
    pub csv: PathBuf,
}

/// Arguments for the `generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Output CSV path.
    #[arg(short, long, default_value = "data/synthetic_event_logs.csv")]
    pub output: PathBuf,

    /// Number of cases.
    #[arg(long, default_value = "500")]
    pub cases: usize,

    /// Fewest events per case.
    #[arg(long, default_value = "20")]
    pub min_events: usize,

    /// Most events per case.
    #[arg(long, default_value = "80")]
    pub max_events: usize,

    /// Seed for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the `check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Base URL of the service to probe.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_command() {
        let cli = Cli::try_parse_from(["procmine", "serve"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve));
        assert!(!cli.json);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["procmine", "report", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_entrypoint_command_after_separator() {
        let cli = Cli::try_parse_from([
            "procmine",
            "entrypoint",
            "--migrate-command",
            "sqlx migrate run",
            "--",
            "procmine",
            "serve",
            "--verbose",
        ])
        .unwrap();
        let Commands::Entrypoint(args) = cli.command else {
            panic!("expected entrypoint");
        };
        assert_eq!(args.migrate_command.as_deref(), Some("sqlx migrate run"));
        assert_eq!(args.command, vec!["procmine", "serve", "--verbose"]);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_entrypoint_without_command() {
        let cli = Cli::try_parse_from(["procmine", "entrypoint"]).unwrap();
        let Commands::Entrypoint(args) = cli.command else {
            panic!("expected entrypoint");
        };
        assert!(args.command.is_empty());
    }

    #[test]
    fn test_parse_generate_defaults() {
        let cli = Cli::try_parse_from(["procmine", "generate"]).unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.cases, 500);
        assert_eq!(args.min_events, 20);
        assert_eq!(args.max_events, 80);
        assert_eq!(args.seed, None);
        assert_eq!(args.output, PathBuf::from("data/synthetic_event_logs.csv"));
    }

    #[test]
    fn test_parse_load_events_requires_path() {
        assert!(Cli::try_parse_from(["procmine", "load-events"]).is_err());
        let cli = Cli::try_parse_from(["procmine", "load-events", "logs.csv"]).unwrap();
        assert!(matches!(cli.command, Commands::LoadEvents(_)));
    }

    #[test]
    fn test_parse_check_default_url() {
        let cli = Cli::try_parse_from(["procmine", "check"]).unwrap();
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.url, "http://127.0.0.1:8000");
    }
}

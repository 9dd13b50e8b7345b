//! CLI command definitions.
//!
//! Each subcommand is a view over the same orchestrator: a one-shot run,
//! the catalog listing, or an interactive console.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub mod console;
pub mod list;
pub mod run;

/// healthcheck - Office compatibility smoke tests for macOS
#[derive(Parser)]
#[command(name = "healthcheck")]
#[command(version, about = "Office compatibility smoke tests for macOS")]
#[command(long_about = r#"
Runs a catalog of compatibility checks against Microsoft Office on macOS,
one check at a time, and reports an overall health verdict.

COMMANDS:
  run      → Run every check sequentially and print the results
  list     → Show the check catalog
  console  → Interactive dashboard (run, reset, status, show <category>)

EXIT CODES:
  0 - All checks passed
  1 - General error
  2 - Invalid arguments
  3 - Issues found
  4 - Configuration error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "HEALTHCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run all checks and report the results
    Run(run::RunArgs),

    /// List categories and their checks
    List(list::ListArgs),

    /// Interactive dashboard on stdin
    Console,
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

//! healthcheck CLI - Main entry point.
//!
//! Exit codes:
//! - 0: All checks passed
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Issues found
//! - 4: Configuration error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use health_core::{HealthConfig, HealthError};

mod commands;
mod render;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const ISSUES_FOUND: u8 = 3;
    pub const CONFIG_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_directives = if cli.verbose {
        "healthcheck=debug,health_core=debug"
    } else if cli.quiet {
        "error"
    } else {
        "healthcheck=info,health_core=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let config = match HealthConfig::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            return ExitCode::from(ExitCodes::CONFIG_ERROR);
        }
    };

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, &config, cli.quiet).await,
        Commands::List(args) => commands::list::execute(args, &config).map(|()| true),
        Commands::Console => commands::console::execute(&config).await.map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::from(ExitCodes::SUCCESS),
        Ok(false) => ExitCode::from(ExitCodes::ISSUES_FOUND),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<HealthError>() {
        Some(HealthError::UnknownCategory(_) | HealthError::UnknownTest { .. }) => {
            ExitCodes::INVALID_ARGS
        }
        Some(
            HealthError::Config(_)
            | HealthError::Toml(_)
            | HealthError::EmptyCategoryName
            | HealthError::DuplicateCategory(_)
            | HealthError::DuplicateTest { .. },
        ) => ExitCodes::CONFIG_ERROR,
        _ => ExitCodes::GENERAL_ERROR,
    }
}

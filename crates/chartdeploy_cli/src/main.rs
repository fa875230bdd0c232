//! chartdeploy CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Values resolution failure
//! - 4: Chart generation failure
//! - 5: Manifest persistence failure

use std::process::ExitCode;

use chartdeploy_helm::HelmError;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALUES_NOT_FOUND: u8 = 3;
    pub const CHART_GENERATION: u8 = 4;
    pub const PERSISTENCE: u8 = 5;
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Render(args) => commands::render::execute(args).await,
        Commands::Apply(args) => commands::lifecycle::apply(args).await,
        Commands::Delete(args) => commands::lifecycle::delete(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(categorize_error(&e))
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "chartdeploy=debug"
    } else if quiet {
        "chartdeploy=warn"
    } else {
        "chartdeploy=info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},warn", default_level)));

    // A subscriber may already be installed; keep it.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Map an error to its exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<HelmError>() {
        Some(HelmError::InvalidNamespace(_)) | Some(HelmError::Config(_)) => {
            ExitCodes::INVALID_ARGS
        }
        Some(HelmError::ValuesNotFound { .. }) => ExitCodes::VALUES_NOT_FOUND,
        Some(HelmError::ChartGeneration(_)) => ExitCodes::CHART_GENERATION,
        Some(HelmError::Persistence { .. }) => ExitCodes::PERSISTENCE,
        _ => ExitCodes::GENERAL_ERROR,
    }
}

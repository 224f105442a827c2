//! # Motion Batcher CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Batching of recorded sessions
//! - Synthetic capture runs
//! - Recording inspection and configuration validation

mod cli;
mod commands;
mod error;
mod input;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_batch, run_info, run_simulate, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(observability_config(&cli))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Motion Batcher CLI starting"
    );

    let result = match &cli.command {
        Commands::Batch(args) => run_batch(args).await,
        Commands::Simulate(args) => run_simulate(args).await,
        Commands::Info(args) => run_info(args),
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Map logging flags onto the observability setup
fn observability_config(cli: &Cli) -> ObservabilityConfig {
    let (level, force_level) = if cli.quiet {
        ("warn", true)
    } else {
        let level = match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        (level, false)
    };

    ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: (cli.metrics_port != 0).then_some(cli.metrics_port),
        default_log_level: level.to_string(),
        force_level,
    }
}

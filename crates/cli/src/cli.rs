//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::BatchStrategy;
use std::path::PathBuf;

/// Motion Batcher - splits accelerometer/gyroscope sessions into storage-sized batches
#[derive(Parser, Debug)]
#[command(
    name = "motion-batcher",
    author,
    version,
    about = "Motion data batching pipeline",
    long_about = "Batches recorded accelerometer and gyroscope sessions for persistence.\n\n\
                  Estimates sampling rates, partitions both streams by entry count or \n\
                  time window, and writes one session record plus one record per batch \n\
                  to the configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "MOTION_BATCHER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "MOTION_BATCHER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "MOTION_BATCHER_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Batch a recorded session and persist it
    Batch(BatchArgs),

    /// Capture a synthetic session and run it through the pipeline
    Simulate(SimulateArgs),

    /// Show counts, span, rates and batch counts of a recording
    Info(InfoArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `batch` command
#[derive(Parser, Debug, Clone)]
pub struct BatchArgs {
    /// Recorded session (WorkoutSession or bare MotionSeries JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to configuration file (TOML or JSON); defaults apply when absent
    #[arg(short, long, env = "MOTION_BATCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the batching strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Override target entries per batch
    #[arg(long)]
    pub target: Option<usize>,

    /// Re-estimate rates from timestamps even when the input carries them
    #[arg(long)]
    pub estimate_rates: bool,

    /// Write records under this directory (file sink)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Batch into memory only; nothing is written
    #[arg(long)]
    pub dry_run: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `simulate` command
#[derive(Parser, Debug, Clone)]
pub struct SimulateArgs {
    /// Capture length in seconds
    #[arg(short, long, default_value = "30")]
    pub duration: f64,

    /// Accelerometer rate (Hz)
    #[arg(long, default_value = "50")]
    pub accel_hz: f64,

    /// Gyroscope rate (Hz)
    #[arg(long, default_value = "25")]
    pub gyro_hz: f64,

    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "MOTION_BATCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write records under this directory (file sink)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit samples at wall-clock pace instead of as fast as possible
    #[arg(long)]
    pub realtime: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Recorded session (WorkoutSession or bare MotionSeries JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Target entries per batch used for the batch counts
    #[arg(long, default_value_t = contracts::DEFAULT_TARGET_ENTRIES_PER_BATCH)]
    pub target: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "motion.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Batching strategy
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyArg {
    /// Fixed entries per batch, split by rate
    Count,
    /// Fixed time window derived from the combined rate
    TimeInterval,
}

impl From<StrategyArg> for BatchStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Count => BatchStrategy::Count,
            StrategyArg::TimeInterval => BatchStrategy::TimeInterval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch_command() {
        let cli = Cli::try_parse_from([
            "motion-batcher",
            "-v",
            "batch",
            "--input",
            "session.json",
            "--strategy",
            "count",
            "--target",
            "3000",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Batch(args) => {
                assert_eq!(args.strategy, Some(StrategyArg::Count));
                assert_eq!(args.target, Some(3000));
                assert!(args.dry_run);
                assert!(!args.estimate_rates);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_simulate_defaults() {
        let cli = Cli::try_parse_from(["motion-batcher", "simulate"]).unwrap();
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.duration, 30.0);
                assert_eq!(args.accel_hz, 50.0);
                assert_eq!(args.gyro_hz, 25.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.metrics_port, 0);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["motion-batcher", "-q", "-v", "validate"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_strategy_conversion() {
        assert_eq!(BatchStrategy::from(StrategyArg::TimeInterval), BatchStrategy::TimeInterval);
    }
}

//! `simulate` command implementation.

use std::time::Duration;

use anyhow::Result;
use capture::{SyntheticClock, SyntheticConfig, SyntheticSource, MAX_REALTIME_HZ};
use tracing::info;

use crate::cli::SimulateArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

use super::{load_blueprint, print_stats};

/// Execute the `simulate` command
pub async fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let source_config = source_config(args)?;
    let blueprint = load_blueprint(args.config.as_deref())?;

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        output: args.output.clone(),
        dry_run: false,
        force_estimate: true,
    });

    let (session, snapshot) = pipeline.capture(SyntheticSource::new(source_config)).await?;
    info!(
        session_id = %session.id,
        samples = snapshot.total(),
        "Synthetic capture complete"
    );

    let stats = pipeline.run(session, Some(snapshot)).await?;
    print_stats(&stats, args.json)?;

    if stats.failures() > 0 {
        anyhow::bail!("{} records failed to persist", stats.failures());
    }
    Ok(())
}

fn source_config(args: &SimulateArgs) -> Result<SyntheticConfig, CliError> {
    let duration = Duration::try_from_secs_f64(args.duration)
        .ok()
        .filter(|d| !d.is_zero())
        .ok_or_else(|| {
            CliError::invalid_argument("--duration", "must be a positive number of seconds")
        })?;
    for (name, hz) in [("--accel-hz", args.accel_hz), ("--gyro-hz", args.gyro_hz)] {
        if !hz.is_finite() || hz < 0.0 {
            return Err(CliError::invalid_argument(name, "must be >= 0"));
        }
        if args.realtime && hz > MAX_REALTIME_HZ {
            return Err(CliError::invalid_argument(
                name,
                format!("must be <= {MAX_REALTIME_HZ} with --realtime"),
            ));
        }
    }

    Ok(SyntheticConfig {
        accelerometer_hz: args.accel_hz,
        gyroscope_hz: args.gyro_hz,
        duration: Some(duration),
        clock: if args.realtime {
            SyntheticClock::Realtime
        } else {
            SyntheticClock::Simulated
        },
        ..Default::default()
    })
}

//! `batch` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::BatchArgs;
use crate::error::CliError;
use crate::input::load_session;
use crate::pipeline::{Pipeline, PipelineConfig};

use super::{load_blueprint, print_stats};

/// Execute the `batch` command
pub async fn run_batch(args: &BatchArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;

    // Apply CLI overrides
    if let Some(strategy) = args.strategy {
        info!(strategy = ?strategy, "Overriding batching strategy from CLI");
        blueprint.batcher.strategy = strategy.into();
    }
    if let Some(target) = args.target {
        if target == 0 {
            return Err(CliError::invalid_argument("--target", "must be > 0").into());
        }
        info!(target, "Overriding target entries per batch from CLI");
        blueprint.batcher.target_entries_per_batch = target;
    }

    let session = load_session(&args.input)
        .with_context(|| format!("Failed to load recording {}", args.input.display()))?;

    info!(
        input = %args.input.display(),
        session_id = %session.id,
        strategy = %blueprint.batcher.strategy,
        target = blueprint.batcher.target_entries_per_batch,
        sinks = blueprint.sinks.len(),
        dry_run = args.dry_run,
        "Recording loaded"
    );

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        output: args.output.clone(),
        dry_run: args.dry_run,
        force_estimate: args.estimate_rates,
    });

    let stats = pipeline.run(session, None).await?;
    print_stats(&stats, args.json)?;

    if stats.verified == Some(false) {
        anyhow::bail!("Stored batches did not reassemble into the recording");
    }
    if stats.failures() > 0 {
        anyhow::bail!("{} records failed to persist", stats.failures());
    }
    Ok(())
}

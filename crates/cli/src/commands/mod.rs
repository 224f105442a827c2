//! Command implementations.

mod batch;
mod info;
mod simulate;
mod validate;

pub use batch::run_batch;
pub use info::run_info;
pub use simulate::run_simulate;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::PipelineBlueprint;
use tracing::info;

use crate::pipeline::PipelineStats;

/// Load the configuration file, or defaults when none is given
fn load_blueprint(path: Option<&Path>) -> Result<PipelineBlueprint> {
    if let Some(path) = path {
        info!(config = %path.display(), "Loading configuration");
        if !path.exists() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }
    }
    config_loader::ConfigLoader::load_or_default(path).with_context(|| match path {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Invalid default configuration".to_string(),
    })
}

/// Print run statistics as text or JSON
fn print_stats(stats: &PipelineStats, json: bool) -> Result<()> {
    if json {
        let json = serde_json::to_string_pretty(&stats.report())
            .context("Failed to serialize pipeline report")?;
        println!("{}", json);
    } else {
        stats.print_summary();
        println!("{}", stats.metrics.summary());
    }
    Ok(())
}

//! `validate` command: load a configuration file and report what it would do.

use std::path::Path;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{BatchStrategy, BatcherConfig, PipelineBlueprint, SinkType};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::cli::ValidateArgs;

#[derive(Debug, Serialize)]
struct ValidationReport {
    config_path: String,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Outcome {
    Valid {
        overview: BlueprintOverview,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    Invalid {
        error: String,
    },
}

/// What the batcher would do with the default rates of this configuration
#[derive(Debug, Serialize)]
struct BlueprintOverview {
    version: String,
    strategy: BatchStrategy,
    target_entries_per_batch: usize,
    default_rates_hz: (u32, u32),
    /// Window length for time batching at the default rates
    window_s: f64,
    /// Accelerometer and gyroscope quotas for count batching at the default rates
    count_quotas: (usize, usize),
    channel_capacity: usize,
    sinks: Vec<String>,
}

impl ValidationReport {
    fn is_valid(&self) -> bool {
        matches!(self.outcome, Outcome::Valid { .. })
    }
}

pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let report = check(&args.config);
    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize validation report")?;
        println!("{json}");
    } else {
        print_report(&report);
    }

    anyhow::ensure!(
        report.is_valid(),
        "Configuration {} is invalid",
        args.config.display()
    );
    Ok(())
}

fn check(path: &Path) -> ValidationReport {
    let outcome = if path.is_file() {
        match ConfigLoader::load_from_path(path) {
            Ok(blueprint) => Outcome::Valid {
                warnings: warnings_for(&blueprint),
                overview: overview(&blueprint),
            },
            Err(e) => {
                if e.is_config() {
                    warn!(error = %e, "Configuration rejected");
                } else {
                    error!(error = %e, "Configuration could not be read");
                }
                Outcome::Invalid {
                    error: e.to_string(),
                }
            }
        }
    } else {
        Outcome::Invalid {
            error: format!("no such file: {}", path.display()),
        }
    };

    ValidationReport {
        config_path: path.display().to_string(),
        outcome,
    }
}

fn default_quotas(config: &BatcherConfig) -> (usize, usize) {
    let target = config.target_entries_per_batch;
    let ratio = config.default_accelerometer_rate as f64 / config.default_gyroscope_rate as f64;
    let gyro = (target as f64 / (1.0 + ratio)).floor() as usize;
    (target - gyro, gyro)
}

fn overview(blueprint: &PipelineBlueprint) -> BlueprintOverview {
    let batcher = &blueprint.batcher;
    let combined = batcher.default_accelerometer_rate + batcher.default_gyroscope_rate;
    BlueprintOverview {
        version: format!("{:?}", blueprint.version),
        strategy: batcher.strategy,
        target_entries_per_batch: batcher.target_entries_per_batch,
        default_rates_hz: (
            batcher.default_accelerometer_rate,
            batcher.default_gyroscope_rate,
        ),
        window_s: batcher.target_entries_per_batch as f64 / combined as f64,
        count_quotas: default_quotas(batcher),
        channel_capacity: blueprint.capture.channel_capacity,
        sinks: blueprint
            .sinks
            .iter()
            .map(|s| format!("{} ({:?})", s.name, s.sink_type))
            .collect(),
    }
}

fn warnings_for(blueprint: &PipelineBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let stores_data = blueprint
        .sinks
        .iter()
        .any(|s| s.sink_type == SinkType::File);

    if blueprint.sinks.is_empty() {
        warnings.push("no sinks: batches are computed but not persisted".to_string());
    } else if !stores_data {
        warnings.push("no file sink: batch data does not outlive the process".to_string());
    }

    if !blueprint.batcher.fallback_rates {
        warnings.push(
            "fallback_rates = false: recordings with fewer than two samples per sensor cannot be batched"
                .to_string(),
        );
    }

    if blueprint.batcher.strategy == BatchStrategy::Count && default_quotas(&blueprint.batcher).1 == 0
    {
        warnings.push("count quota for the gyroscope is 0 at the default rates".to_string());
    }

    warnings
}

fn print_report(report: &ValidationReport) {
    match &report.outcome {
        Outcome::Valid { overview, warnings } => {
            println!("✓ {} is valid", report.config_path);
            println!("   ├─ Version: {}", overview.version);
            println!(
                "   ├─ Strategy: {} (target {} entries)",
                overview.strategy, overview.target_entries_per_batch
            );
            println!(
                "   ├─ Default rates: {} Hz / {} Hz",
                overview.default_rates_hz.0, overview.default_rates_hz.1
            );
            println!(
                "   ├─ Window: {:.3}s, count quotas {} + {}",
                overview.window_s, overview.count_quotas.0, overview.count_quotas.1
            );
            println!("   ├─ Channel capacity: {}", overview.channel_capacity);
            println!("   └─ Sinks: [{}]", overview.sinks.join(", "));
            for warning in warnings {
                println!("⚠ {warning}");
            }
        }
        Outcome::Invalid { error } => {
            println!("✗ {} is invalid", report.config_path);
            println!("   └─ {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_config_reports_quotas_and_warnings() {
        let file = config_file(
            "[batcher]\nstrategy = \"count\"\ntarget_entries_per_batch = 30\n",
            ".toml",
        );
        let report = check(file.path());

        let Outcome::Valid { overview, warnings } = &report.outcome else {
            panic!("expected valid outcome: {report:?}");
        };
        assert_eq!(overview.strategy, BatchStrategy::Count);
        assert_eq!(overview.count_quotas, (20, 10));
        assert!((overview.window_s - 0.4).abs() < 1e-12);
        assert!(warnings[0].starts_with("no sinks"));
    }

    #[test]
    fn test_log_only_sinks_warn() {
        let file = config_file(
            "[[sinks]]\nname = \"trace\"\nsink_type = \"log\"\n",
            ".toml",
        );
        let Outcome::Valid { warnings, .. } = check(file.path()).outcome else {
            panic!("expected valid outcome");
        };
        assert!(warnings.iter().any(|w| w.starts_with("no file sink")));
    }

    #[test]
    fn test_invalid_config() {
        let file = config_file(r#"{"batcher": {"target_entries_per_batch": 0}}"#, ".json");
        let report = check(file.path());
        assert!(!report.is_valid());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "invalid");
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("target_entries_per_batch"));
    }

    #[test]
    fn test_missing_file() {
        let args = ValidateArgs {
            config: "/nonexistent/motion.toml".into(),
            json: false,
        };
        assert!(!check(&args.config).is_valid());
        assert!(run_validate(&args).is_err());
    }
}

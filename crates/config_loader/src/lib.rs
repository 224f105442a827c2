//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate batching, capture and sink settings
//! - Produce a `PipelineBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("motion.toml")).unwrap();
//! println!("strategy: {}", blueprint.batcher.strategy);
//! ```

mod parser;
mod validator;

pub use contracts::PipelineBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Detects the format from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<PipelineBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), ?format, "loading configuration");
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<PipelineBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Load from `path` if given, otherwise validated defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<PipelineBlueprint, ContractError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => {
                let blueprint = PipelineBlueprint::default();
                validator::validate(&blueprint)?;
                Ok(blueprint)
            }
        }
    }

    /// Check an already built blueprint
    pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    pub fn to_toml(blueprint: &PipelineBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    pub fn to_json(blueprint: &PipelineBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str());
        ext.and_then(ConfigFormat::from_extension)
            .ok_or_else(|| ContractError::unsupported_format(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BatchStrategy, SinkType};
    use std::io::Write;

    const FULL_TOML: &str = r#"
[batcher]
strategy = "count"
target_entries_per_batch = 3000
fallback_rates = true
default_accelerometer_rate = 100
default_gyroscope_rate = 50

[capture]
channel_capacity = 512
stop_timeout_ms = 2000

[[sinks]]
name = "disk"
sink_type = "file"
queue_capacity = 16
[sinks.params]
base_path = "./sessions"

[[sinks]]
name = "log"
sink_type = "log"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let bp = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.batcher.strategy, BatchStrategy::Count);
        assert_eq!(bp.batcher.default_accelerometer_rate, 100);
        assert_eq!(bp.capture.stop_timeout_ms, 2000);
        assert_eq!(bp.sinks.len(), 2);
        assert_eq!(bp.sinks[1].sink_type, SinkType::Log);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.batcher, bp2.batcher);
        assert_eq!(bp.capture, bp2.capture);
        assert_eq!(bp.sinks, bp2.sinks);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.sinks, bp2.sinks);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[[sinks]]
name = "disk"
sink_type = "file"
"#;
        let err = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(FULL_TOML.as_bytes()).unwrap();
        let bp = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(bp.batcher.target_entries_per_batch, 3000);

        let yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(yaml.path()).unwrap_err();
        assert!(matches!(
            err,
            ContractError::UnsupportedFormat { extension: Some(ref e) } if e == "yaml"
        ));
    }

    #[test]
    fn test_load_or_default() {
        let bp = ConfigLoader::load_or_default(None).unwrap();
        assert_eq!(bp.batcher.target_entries_per_batch, 10_000);
    }
}

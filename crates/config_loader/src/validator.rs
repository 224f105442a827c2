//! Configuration validation
//!
//! Rules:
//! - target_entries_per_batch > 0
//! - default rates > 0
//! - channel_capacity > 0
//! - sink names non-empty and unique
//! - sink queue_capacity > 0
//! - file sinks carry a base_path

use std::collections::HashSet;

use contracts::{ContractError, PipelineBlueprint, SinkType};

/// Validate a PipelineBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    validate_batcher(blueprint)?;
    validate_capture(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_batcher(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let batcher = &blueprint.batcher;

    if batcher.target_entries_per_batch == 0 {
        return Err(ContractError::config_validation(
            "batcher.target_entries_per_batch",
            "target_entries_per_batch must be > 0",
        ));
    }

    for (field, rate) in [
        ("batcher.default_accelerometer_rate", batcher.default_accelerometer_rate),
        ("batcher.default_gyroscope_rate", batcher.default_gyroscope_rate),
    ] {
        if rate == 0 {
            return Err(ContractError::config_validation(field, "rate must be > 0 Hz"));
        }
    }

    Ok(())
}

fn validate_capture(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    if blueprint.capture.channel_capacity == 0 {
        return Err(ContractError::config_validation(
            "capture.channel_capacity",
            "channel_capacity must be > 0",
        ));
    }
    Ok(())
}

fn validate_sinks(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
        if sink.sink_type == SinkType::File
            && sink.params.get("base_path").is_none_or(|p| p.trim().is_empty())
        {
            return Err(ContractError::config_validation(
                format!("sinks[{}].params.base_path", sink.name),
                "file sink requires base_path",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SinkConfig;
    use std::collections::HashMap;

    fn minimal_blueprint() -> PipelineBlueprint {
        let mut params = HashMap::new();
        params.insert("base_path".to_string(), "./output".to_string());
        PipelineBlueprint {
            sinks: vec![
                SinkConfig {
                    name: "disk".into(),
                    sink_type: SinkType::File,
                    queue_capacity: 64,
                    params,
                },
                SinkConfig {
                    name: "log".into(),
                    sink_type: SinkType::Log,
                    queue_capacity: 64,
                    params: HashMap::new(),
                },
            ],
            ..Default::default()
        }
    }

    fn error_text(bp: &PipelineBlueprint) -> String {
        validate(bp).unwrap_err().to_string()
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&minimal_blueprint()).is_ok());
        assert!(validate(&PipelineBlueprint::default()).is_ok());
    }

    #[test]
    fn test_zero_target() {
        let mut bp = minimal_blueprint();
        bp.batcher.target_entries_per_batch = 0;
        let err = error_text(&bp);
        assert!(err.contains("target_entries_per_batch"), "got: {err}");
    }

    #[test]
    fn test_zero_default_rate() {
        let mut bp = minimal_blueprint();
        bp.batcher.default_gyroscope_rate = 0;
        let err = error_text(&bp);
        assert!(err.contains("batcher.default_gyroscope_rate"), "got: {err}");
    }

    #[test]
    fn test_zero_channel_capacity() {
        let mut bp = minimal_blueprint();
        bp.capture.channel_capacity = 0;
        let err = error_text(&bp);
        assert!(err.contains("channel_capacity must be > 0"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks[1].name = "disk".into();
        let err = error_text(&bp);
        assert!(err.contains("duplicate sink name"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks[1].name = "  ".into();
        let err = error_text(&bp);
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_file_sink_without_base_path() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].params.clear();
        let err = error_text(&bp);
        assert!(err.contains("requires base_path"), "got: {err}");
    }
}

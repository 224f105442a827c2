//! Errors shared by configuration loading and sinks

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ContractError {
    /// Configuration text could not be read as a `PipelineBlueprint`
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// File extension is neither `.toml` nor `.json`
    #[error("unsupported config format: {extension:?} (expected .toml or .json)")]
    UnsupportedFormat { extension: Option<String> },

    /// Parsed configuration breaks a rule
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// A sink failed to persist a session or batch record
    #[error("sink '{sink_name}' failed to write {record}: {message}")]
    SinkWrite {
        sink_name: String,
        record: &'static str,
        message: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Parse error that keeps the underlying parser error as its source
    pub fn config_parse_from<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigParse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn unsupported_format(extension: Option<&str>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.map(str::to_string),
        }
    }

    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// `record` names what was being written ("session" or "batch")
    pub fn sink_write(
        sink_name: impl Into<String>,
        record: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            record,
            message: message.into(),
        }
    }

    /// True for errors raised while loading or checking configuration
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse { .. } | Self::UnsupportedFormat { .. } | Self::ConfigValidation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_parse_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad byte");
        let err = ContractError::config_parse_from("TOML parse error", io);
        assert!(err.source().is_some());
        assert!(err.is_config());
        assert_eq!(err.to_string(), "config parse error: TOML parse error");
    }

    #[test]
    fn test_sink_write_message() {
        let err = ContractError::sink_write("disk", "batch", "disk full");
        assert_eq!(err.to_string(), "sink 'disk' failed to write batch: disk full");
        assert!(!err.is_config());
    }

    #[test]
    fn test_unsupported_format_message() {
        let err = ContractError::unsupported_format(Some("yaml"));
        assert!(err.to_string().contains("\"yaml\""));
        assert!(ContractError::unsupported_format(None).is_config());
    }
}

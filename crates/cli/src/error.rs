//! Error types for CLI input handling.

use std::path::PathBuf;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Input recording not found
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// Input is neither a WorkoutSession nor a MotionSeries
    #[error("Failed to parse input {}: {message}", path.display())]
    InputParse { path: PathBuf, message: String },

    /// Invalid command-line value
    #[error("Invalid argument {name}: {message}")]
    InvalidArgument { name: &'static str, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn input_not_found(path: impl Into<PathBuf>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    pub fn input_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InputParse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

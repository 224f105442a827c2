//! Dispatcher error types

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while building sinks or reading persisted sessions
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// A configured sink could not be constructed
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// No session directory under the base path
    #[error("session {session_id} not found under {}", base.display())]
    SessionNotFound { session_id: Uuid, base: PathBuf },

    /// A persisted record did not parse
    #[error("malformed record {}: {source}", path.display())]
    MalformedRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Sink write/read error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Dispatcher Result alias
pub type Result<T> = std::result::Result<T, DispatcherError>;

//! Capture error types

use contracts::SensorKind;
use thiserror::Error;

/// Capture error
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The collector for this sensor is gone
    #[error("capture channel closed for {sensor}")]
    ChannelClosed {
        /// Sensor whose channel closed
        sensor: SensorKind,
    },

    /// `stop` was already called on this session
    #[error("capture session already stopped")]
    AlreadyStopped,

    /// Producers still held senders when the stop timeout elapsed
    #[error("capture did not drain within {timeout_ms} ms")]
    DrainTimeout {
        /// Configured bound
        timeout_ms: u64,
    },

    /// A collector task panicked or was cancelled
    #[error("collector for {sensor} failed: {message}")]
    CollectorPanicked {
        /// Sensor whose collector failed
        sensor: SensorKind,
        /// Join error text
        message: String,
    },
}

/// Capture Result alias
pub type Result<T> = std::result::Result<T, CaptureError>;

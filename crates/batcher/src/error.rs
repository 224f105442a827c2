//! Batcher error types

use contracts::{BatchStrategy, SensorKind};
use thiserror::Error;

/// Rejected batching input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BatchError {
    /// Target entries per batch must be positive
    #[error("target entries per batch must be > 0")]
    InvalidTarget,

    /// A rate needed for sizing has not been estimated or defaulted
    #[error("{sensor} rate is unset; estimate or default it before batching")]
    RateUnset {
        /// Sensor whose rate is missing
        sensor: SensorKind,
    },

    /// A rate used as a divisor is zero
    #[error(
        "degenerate rate for {strategy} batching: accelerometer={accelerometer_rate} Hz, gyroscope={gyroscope_rate} Hz"
    )]
    DegenerateRate {
        /// Strategy that rejected the rates
        strategy: BatchStrategy,
        /// Accelerometer rate (Hz)
        accelerometer_rate: u32,
        /// Gyroscope rate (Hz)
        gyroscope_rate: u32,
    },

    /// Timestamps are not ascending
    #[error("{sensor} samples are not sorted by timestamp at index {index}")]
    UnsortedInput {
        /// Offending stream
        sensor: SensorKind,
        /// Index of the first sample that is earlier than its predecessor
        index: usize,
    },
}

/// Batcher Result alias
pub type Result<T> = std::result::Result<T, BatchError>;

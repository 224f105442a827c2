//! # Capture
//!
//! Collects accelerometer and gyroscope samples from concurrent producers
//! into one `MotionSeries`.
//!
//! Responsibilities:
//! - One bounded channel and collector task per sensor
//! - `SampleSource` interface for producers (synthetic or device-backed)
//! - Drain-and-close barrier on stop, bounded by a timeout
//! - Per-sensor sample and out-of-order counters
//!
//! ## Usage Example
//!
//! ```ignore
//! use capture::{CaptureSession, SyntheticSource};
//! use std::sync::Arc;
//!
//! let mut session = CaptureSession::start(&blueprint.capture);
//! let source = Arc::new(SyntheticSource::simulated(50.0, 25.0, Duration::from_secs(30)));
//! session.add_source(Box::new(source.clone()))?;
//!
//! source.wait_finished().await;
//! let series = session.stop().await?;
//! ```

mod counters;
mod error;
mod session;
mod source;
mod synthetic;

// Re-exports
pub use contracts::{CaptureConfig, MotionSeries, Sample, SensorKind};
pub use counters::{CaptureMetrics, CaptureSnapshot};
pub use error::{CaptureError, Result};
pub use session::CaptureSession;
pub use source::{SampleSender, SampleSource};
pub use synthetic::{
    SyntheticClock, SyntheticConfig, SyntheticSource, MAX_REALTIME_HZ, MIN_REALTIME_PERIOD,
};

//! # Batcher
//!
//! Partitions a captured accelerometer + gyroscope session into bounded
//! batches for persistence.
//!
//! Provides:
//! - capture rate estimation from timestamps
//! - session span over both streams
//! - count-based batching (fixed entries, rate-proportional split)
//! - time-window batching (fixed duration from the combined rate)
//!
//! Everything here is synchronous and deterministic.
//!
//! ## Example
//!
//! ```ignore
//! use batcher::{BatcherConfig, MotionBatcher};
//!
//! let batcher = MotionBatcher::new(BatcherConfig::default());
//! batcher.estimate_rates(&mut series);
//! let plan = batcher.batch(&series)?;
//! println!("{}", plan.summary);
//! ```

mod count;
mod engine;
mod error;
mod order;
mod rate;
mod span;
mod window;

pub use count::{batch_by_count, count_quotas, CountQuotas};
pub use engine::{BatchPlan, BatchSummary, MotionBatcher, RateEstimate, RateEstimates, RateSource};
pub use error::{BatchError, Result};
pub use order::ensure_sorted;
pub use rate::{estimate_rate, rate_to_hz};
pub use span::session_span;
pub use window::{batch_by_time_interval, batch_time_interval, number_of_batches};

// Re-export contracts types
pub use contracts::{
    BatchStrategy, BatcherConfig, MotionBatch, MotionSeries, Sample, SensorKind, SessionSpan,
    DEFAULT_TARGET_ENTRIES_PER_BATCH,
};

fn push_batch(batches: &mut Vec<MotionBatch>, data: MotionSeries) {
    let sequence = batches.len();
    batches.push(MotionBatch { sequence, data });
}

/// Concatenate batches back into one series, ordered by `sequence`.
///
/// Rates are taken from the first batch.
pub fn reassemble(batches: &[MotionBatch]) -> MotionSeries {
    let mut ordered: Vec<&MotionBatch> = batches.iter().collect();
    ordered.sort_by_key(|b| b.sequence);

    let mut series = ordered
        .first()
        .map(|b| b.data.empty_like())
        .unwrap_or_default();
    for batch in ordered {
        series
            .accelerometer
            .extend_from_slice(&batch.data.accelerometer);
        series.gyroscope.extend_from_slice(&batch.data.gyroscope);
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reassemble_orders_by_sequence() {
        let a = MotionBatch {
            sequence: 1,
            data: MotionSeries::new(vec![Sample::new(2.0, 0.0, 0.0, 0.0)], vec![]).with_rates(50, 25),
        };
        let b = MotionBatch {
            sequence: 0,
            data: MotionSeries::new(vec![Sample::new(1.0, 0.0, 0.0, 0.0)], vec![]).with_rates(50, 25),
        };
        let series = reassemble(&[a, b]);
        assert_eq!(series.timestamps(SensorKind::Accelerometer), vec![1.0, 2.0]);
        assert_eq!(series.accelerometer_rate, Some(50));
    }

    #[test]
    fn test_reassemble_empty() {
        assert_eq!(reassemble(&[]), MotionSeries::default());
    }
}

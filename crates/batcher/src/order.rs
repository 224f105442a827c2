//! Timestamp order checks applied before batching.

use std::cmp::Ordering;

use contracts::{MotionSeries, Sample, SensorKind};

use crate::error::{BatchError, Result};

/// Index of the first sample that breaks ascending order.
///
/// Equal neighbours are allowed. A NaN timestamp breaks order at its own
/// index.
pub(crate) fn first_unsorted(samples: &[Sample]) -> Option<usize> {
    if let Some(first) = samples.first() {
        if first.timestamp.is_nan() {
            return Some(0);
        }
    }
    samples
        .windows(2)
        .position(|w| {
            !matches!(
                w[0].timestamp.partial_cmp(&w[1].timestamp),
                Some(Ordering::Less | Ordering::Equal)
            )
        })
        .map(|i| i + 1)
}

/// Reject a series whose streams are not sorted by timestamp.
pub fn ensure_sorted(series: &MotionSeries) -> Result<()> {
    for sensor in SensorKind::ALL {
        if let Some(index) = first_unsorted(series.samples(sensor)) {
            return Err(BatchError::UnsortedInput { sensor, index });
        }
    }
    Ok(())
}

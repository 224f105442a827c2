//! Count-based batching.
//!
//! Each batch holds a fixed number of entries split between the two
//! sensors in proportion to their capture rates. The accelerometer stream
//! drives the loop; gyroscope samples are paired by position, not by
//! timestamp.

use contracts::{BatchStrategy, MotionBatch, MotionSeries, SensorKind};
use tracing::{debug, instrument, warn};

use crate::error::{BatchError, Result};
use crate::order::ensure_sorted;
use crate::push_batch;

/// Per-batch entry split between the two sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountQuotas {
    pub accelerometer: usize,
    pub gyroscope: usize,
}

/// Split `target` between the sensors by rate ratio.
///
/// `gyroscope = floor(target / (1 + accel_rate / gyro_rate))`; the
/// accelerometer gets the remainder. When the series has no gyroscope
/// samples at all, the whole target goes to the accelerometer.
pub fn count_quotas(series: &MotionSeries, target_entries_per_batch: usize) -> Result<CountQuotas> {
    if target_entries_per_batch == 0 {
        return Err(BatchError::InvalidTarget);
    }
    let accel_rate = series
        .accelerometer_rate
        .ok_or(BatchError::RateUnset {
            sensor: SensorKind::Accelerometer,
        })?;
    let gyro_rate = series.gyroscope_rate.ok_or(BatchError::RateUnset {
        sensor: SensorKind::Gyroscope,
    })?;
    if gyro_rate == 0 {
        return Err(BatchError::DegenerateRate {
            strategy: BatchStrategy::Count,
            accelerometer_rate: accel_rate,
            gyroscope_rate: gyro_rate,
        });
    }

    let gyroscope = if series.gyroscope.is_empty() {
        0
    } else {
        let ratio = accel_rate as f64 / gyro_rate as f64;
        (target_entries_per_batch as f64 / (1.0 + ratio)).floor() as usize
    };

    Ok(CountQuotas {
        accelerometer: target_entries_per_batch - gyroscope,
        gyroscope,
    })
}

/// Partition a series into batches of roughly `target_entries_per_batch`
/// entries.
///
/// A batch is flushed once the accelerometer quota is met and the
/// gyroscope side is satisfied, meaning its quota is met or the gyroscope
/// stream has run out. Gyroscope samples left unpaired when the
/// accelerometer stream ends are not emitted.
#[instrument(
    name = "batch_by_count",
    skip(series),
    fields(
        accelerometer = series.accelerometer.len(),
        gyroscope = series.gyroscope.len()
    )
)]
pub fn batch_by_count(
    series: &MotionSeries,
    target_entries_per_batch: usize,
) -> Result<Vec<MotionBatch>> {
    if target_entries_per_batch == 0 {
        return Err(BatchError::InvalidTarget);
    }
    if series.is_empty() {
        return Ok(Vec::new());
    }
    let quotas = count_quotas(series, target_entries_per_batch)?;
    ensure_sorted(series)?;

    debug!(
        accelerometer_quota = quotas.accelerometer,
        gyroscope_quota = quotas.gyroscope,
        "count quotas"
    );

    let gyro = &series.gyroscope;
    let mut batches = Vec::new();
    let mut current = series.empty_like();
    let mut gyro_cursor = 0;
    let mut accel_count = 0;
    let mut gyro_count = 0;

    for sample in &series.accelerometer {
        current.accelerometer.push(*sample);
        accel_count += 1;

        if gyro_count < quotas.gyroscope {
            if let Some(g) = gyro.get(gyro_cursor) {
                current.gyroscope.push(*g);
                gyro_cursor += 1;
                gyro_count += 1;
            }
        }

        let gyro_satisfied = gyro_count >= quotas.gyroscope || gyro_cursor >= gyro.len();
        if accel_count >= quotas.accelerometer && gyro_satisfied {
            let full = std::mem::replace(&mut current, series.empty_like());
            push_batch(&mut batches, full);
            accel_count = 0;
            gyro_count = 0;
        }
    }

    if !current.is_empty() {
        push_batch(&mut batches, current);
    }

    let dropped = gyro.len() - gyro_cursor;
    if dropped > 0 {
        warn!(
            dropped,
            paired = gyro_cursor,
            "accelerometer stream ended before gyroscope; unpaired gyroscope samples not batched"
        );
        metrics::counter!("motion_batcher_gyro_dropped_total").increment(dropped as u64);
    }

    Ok(batches)
}

//! Time-window batching.
//!
//! Both streams are merged in timestamp order and cut into windows whose
//! length is chosen so that a full window holds about
//! `target_entries_per_batch` entries at the combined capture rate.

use contracts::{BatchStrategy, MotionBatch, MotionSeries, Sample, SensorKind};
use tracing::{debug, instrument};

use crate::error::{BatchError, Result};
use crate::order::ensure_sorted;
use crate::push_batch;

/// Window length (seconds) for the given target:
/// `target / (accel_rate + gyro_rate)`.
pub fn batch_time_interval(series: &MotionSeries, target_entries_per_batch: usize) -> Result<f64> {
    if target_entries_per_batch == 0 {
        return Err(BatchError::InvalidTarget);
    }
    let accel_rate = series.accelerometer_rate.ok_or(BatchError::RateUnset {
        sensor: SensorKind::Accelerometer,
    })?;
    let gyro_rate = series.gyroscope_rate.ok_or(BatchError::RateUnset {
        sensor: SensorKind::Gyroscope,
    })?;

    let combined = accel_rate as u64 + gyro_rate as u64;
    if combined == 0 {
        return Err(BatchError::DegenerateRate {
            strategy: BatchStrategy::TimeInterval,
            accelerometer_rate: accel_rate,
            gyroscope_rate: gyro_rate,
        });
    }

    Ok(target_entries_per_batch as f64 / combined as f64)
}

fn next_timestamp(samples: &[Sample], cursor: usize) -> f64 {
    samples.get(cursor).map_or(f64::INFINITY, |s| s.timestamp)
}

/// Partition a series into consecutive time windows.
///
/// Every sample lands in exactly one batch. A batch opens at the timestamp
/// of its first sample and takes every later sample no more than one
/// interval past that start.
#[instrument(
    name = "batch_by_time_interval",
    skip(series),
    fields(
        accelerometer = series.accelerometer.len(),
        gyroscope = series.gyroscope.len()
    )
)]
pub fn batch_by_time_interval(
    series: &MotionSeries,
    target_entries_per_batch: usize,
) -> Result<Vec<MotionBatch>> {
    if target_entries_per_batch == 0 {
        return Err(BatchError::InvalidTarget);
    }
    if series.is_empty() {
        return Ok(Vec::new());
    }
    let interval = batch_time_interval(series, target_entries_per_batch)?;
    ensure_sorted(series)?;

    debug!(interval_s = interval, "time window");

    let accel = &series.accelerometer;
    let gyro = &series.gyroscope;
    let mut batches = Vec::new();
    let mut current = series.empty_like();
    let mut batch_start: Option<f64> = None;
    let (mut a, mut g) = (0, 0);

    while a < accel.len() || g < gyro.len() {
        let now = next_timestamp(accel, a).min(next_timestamp(gyro, g));

        match batch_start {
            None => batch_start = Some(now),
            Some(start) if now - start > interval => {
                let full = std::mem::replace(&mut current, series.empty_like());
                push_batch(&mut batches, full);
                batch_start = Some(now);
            }
            Some(_) => {}
        }

        while a < accel.len() && accel[a].timestamp == now {
            current.accelerometer.push(accel[a]);
            a += 1;
        }
        while g < gyro.len() && gyro[g].timestamp == now {
            current.gyroscope.push(gyro[g]);
            g += 1;
        }
    }

    if !current.is_empty() {
        push_batch(&mut batches, current);
    }

    Ok(batches)
}

/// Number of batches [`batch_by_time_interval`] produces for this series.
pub fn number_of_batches(series: &MotionSeries, target_entries_per_batch: usize) -> Result<usize> {
    Ok(batch_by_time_interval(series, target_entries_per_batch)?.len())
}

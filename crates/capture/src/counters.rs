//! Capture counters

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::SensorKind;

/// Shared capture counters, updated by the collector tasks
#[derive(Debug, Default)]
pub struct CaptureMetrics {
    /// Accelerometer samples collected
    pub accelerometer_received: AtomicU64,

    /// Gyroscope samples collected
    pub gyroscope_received: AtomicU64,

    /// Samples that arrived earlier than their predecessor
    pub out_of_order: AtomicU64,
}

impl CaptureMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one collected sample
    pub fn record_received(&self, sensor: SensorKind) {
        let counter = match sensor {
            SensorKind::Accelerometer => &self.accelerometer_received,
            SensorKind::Gyroscope => &self.gyroscope_received,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("motion_capture_samples_total", "sensor" => sensor.as_str()).increment(1);
    }

    /// Record an out-of-order arrival
    pub fn record_out_of_order(&self, sensor: SensorKind) {
        self.out_of_order.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("motion_capture_out_of_order_total", "sensor" => sensor.as_str())
            .increment(1);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            accelerometer_received: self.accelerometer_received.load(Ordering::Relaxed),
            gyroscope_received: self.gyroscope_received.load(Ordering::Relaxed),
            out_of_order: self.out_of_order.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`CaptureMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureSnapshot {
    pub accelerometer_received: u64,
    pub gyroscope_received: u64,
    pub out_of_order: u64,
}

impl CaptureSnapshot {
    pub fn total(&self) -> u64 {
        self.accelerometer_received + self.gyroscope_received
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts_per_sensor() {
        let metrics = CaptureMetrics::new();
        metrics.record_received(SensorKind::Accelerometer);
        metrics.record_received(SensorKind::Accelerometer);
        metrics.record_received(SensorKind::Gyroscope);
        metrics.record_out_of_order(SensorKind::Gyroscope);

        let snap = metrics.snapshot();
        assert_eq!(snap.accelerometer_received, 2);
        assert_eq!(snap.gyroscope_received, 1);
        assert_eq!(snap.out_of_order, 1);
        assert_eq!(snap.total(), 3);
    }
}

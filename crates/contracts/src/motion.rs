//! MotionSeries - Capture output, batcher input
//!
//! Two independently sampled sensor streams plus their capture rates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Motion sensor kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Linear acceleration (g)
    Accelerometer,
    /// Rotation rate (rad/s)
    Gyroscope,
}

impl SensorKind {
    /// Both kinds, accelerometer first
    pub const ALL: [SensorKind; 2] = [SensorKind::Accelerometer, SensorKind::Gyroscope];

    /// Stable lowercase name, used for log fields and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gyroscope => "gyroscope",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped three-axis reading
///
/// Accelerometer and gyroscope readings share this shape; the sequence
/// holding a sample decides what the axes mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Capture timestamp (seconds)
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Sample {
    pub fn new(timestamp: f64, x: f64, y: f64, z: f64) -> Self {
        Self { timestamp, x, y, z }
    }
}

/// Full capture of both motion streams for one session
///
/// Both sequences are expected in ascending timestamp order. Rates are
/// `None` until estimated or defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionSeries {
    /// Accelerometer samples in capture order
    #[serde(default)]
    pub accelerometer: Vec<Sample>,

    /// Gyroscope samples in capture order
    #[serde(default)]
    pub gyroscope: Vec<Sample>,

    /// Accelerometer capture rate (Hz)
    #[serde(default)]
    pub accelerometer_rate: Option<u32>,

    /// Gyroscope capture rate (Hz)
    #[serde(default)]
    pub gyroscope_rate: Option<u32>,
}

impl MotionSeries {
    /// Create a series with unset rates
    pub fn new(accelerometer: Vec<Sample>, gyroscope: Vec<Sample>) -> Self {
        Self {
            accelerometer,
            gyroscope,
            accelerometer_rate: None,
            gyroscope_rate: None,
        }
    }

    /// Set both capture rates
    pub fn with_rates(mut self, accelerometer_rate: u32, gyroscope_rate: u32) -> Self {
        self.accelerometer_rate = Some(accelerometer_rate);
        self.gyroscope_rate = Some(gyroscope_rate);
        self
    }

    /// True when neither stream holds a sample
    pub fn is_empty(&self) -> bool {
        self.accelerometer.is_empty() && self.gyroscope.is_empty()
    }

    /// Total entries across both streams
    pub fn len(&self) -> usize {
        self.accelerometer.len() + self.gyroscope.len()
    }

    /// Samples of one stream
    pub fn samples(&self, kind: SensorKind) -> &[Sample] {
        match kind {
            SensorKind::Accelerometer => &self.accelerometer,
            SensorKind::Gyroscope => &self.gyroscope,
        }
    }

    /// Mutable samples of one stream
    pub fn samples_mut(&mut self, kind: SensorKind) -> &mut Vec<Sample> {
        match kind {
            SensorKind::Accelerometer => &mut self.accelerometer,
            SensorKind::Gyroscope => &mut self.gyroscope,
        }
    }

    /// Capture rate of one stream
    pub fn rate(&self, kind: SensorKind) -> Option<u32> {
        match kind {
            SensorKind::Accelerometer => self.accelerometer_rate,
            SensorKind::Gyroscope => self.gyroscope_rate,
        }
    }

    /// Overwrite the capture rate of one stream
    pub fn set_rate(&mut self, kind: SensorKind, rate: Option<u32>) {
        match kind {
            SensorKind::Accelerometer => self.accelerometer_rate = rate,
            SensorKind::Gyroscope => self.gyroscope_rate = rate,
        }
    }

    /// Timestamps of one stream, in stored order
    pub fn timestamps(&self, kind: SensorKind) -> Vec<f64> {
        self.samples(kind).iter().map(|s| s.timestamp).collect()
    }

    /// Empty series carrying this series' rates
    pub fn empty_like(&self) -> Self {
        Self {
            accelerometer: Vec::new(),
            gyroscope: Vec::new(),
            accelerometer_rate: self.accelerometer_rate,
            gyroscope_rate: self.gyroscope_rate,
        }
    }
}

/// One bounded partition of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionBatch {
    /// Position in the batch list (0-based)
    pub sequence: usize,

    /// Batch contents, rates copied from the parent series
    pub data: MotionSeries,
}

impl MotionBatch {
    /// Total entries in this batch
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 1-based number used when persisting
    pub fn batch_number(&self) -> usize {
        self.sequence + 1
    }
}

/// Earliest and latest timestamp over both streams
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSpan {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl SessionSpan {
    /// Elapsed seconds between start and end
    pub fn duration(&self) -> Option<f64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_accessors() {
        let series = MotionSeries::new(
            vec![Sample::new(0.0, 1.0, 2.0, 3.0), Sample::new(0.1, 1.0, 2.0, 3.0)],
            vec![Sample::new(0.05, 0.1, 0.2, 0.3)],
        )
        .with_rates(50, 25);

        assert_eq!(series.len(), 3);
        assert!(!series.is_empty());
        assert_eq!(series.samples(SensorKind::Gyroscope).len(), 1);
        assert_eq!(series.rate(SensorKind::Accelerometer), Some(50));
        assert_eq!(series.timestamps(SensorKind::Accelerometer), vec![0.0, 0.1]);

        let empty = series.empty_like();
        assert!(empty.is_empty());
        assert_eq!(empty.gyroscope_rate, Some(25));
    }

    #[test]
    fn test_series_rates_default_to_unset() {
        let series: MotionSeries = serde_json::from_str(r#"{"accelerometer": []}"#).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.accelerometer_rate, None);
        assert_eq!(series.gyroscope_rate, None);
    }

    #[test]
    fn test_span_duration() {
        let span = SessionSpan {
            start: Some(2.0),
            end: Some(5.5),
        };
        assert_eq!(span.duration(), Some(3.5));
        assert_eq!(SessionSpan::default().duration(), None);
        assert!(SessionSpan::default().is_empty());
    }

    #[test]
    fn test_batch_number_is_one_based() {
        let batch = MotionBatch {
            sequence: 0,
            data: MotionSeries::default(),
        };
        assert_eq!(batch.batch_number(), 1);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_batch_number_past_u32_range() {
        let sequence = u32::MAX as usize + 5;
        let batch = MotionBatch {
            sequence,
            data: MotionSeries::default(),
        };
        assert_eq!(batch.batch_number(), sequence + 1);
    }

    #[test]
    fn test_sensor_kind_serde_names() {
        let json = serde_json::to_string(&SensorKind::Gyroscope).unwrap();
        assert_eq!(json, "\"gyroscope\"");
        assert_eq!(SensorKind::Accelerometer.to_string(), "accelerometer");
    }
}

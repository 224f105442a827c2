//! Persisted records
//!
//! One `SessionRecord` per workout, one `BatchRecord` per batch, linked by
//! session id and a 1-based batch number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Sample, WorkoutInfo};

/// Parent record describing a whole session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: Uuid,

    /// Record creation time
    pub created: DateTime<Utc>,

    pub info: WorkoutInfo,

    /// Earliest sample timestamp (seconds)
    pub start_time: Option<f64>,

    /// Latest sample timestamp (seconds)
    pub end_time: Option<f64>,

    /// Number of child batch records
    pub number_of_batches: usize,

    pub accelerometer_rate: Option<u32>,

    pub gyroscope_rate: Option<u32>,

    /// Total accelerometer samples across all batches
    pub accelerometer_entries: usize,

    /// Total gyroscope samples across all batches
    pub gyroscope_entries: usize,
}

/// Child record holding one batch of samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub session_id: Uuid,

    /// Order of this batch within the session (1-based)
    pub batch_number: usize,

    pub start_time: f64,

    pub end_time: f64,

    pub accelerometer_rate: Option<u32>,

    pub gyroscope_rate: Option<u32>,

    pub accelerometer: Vec<Sample>,

    pub gyroscope: Vec<Sample>,
}

impl BatchRecord {
    /// Total samples in this record
    pub fn entries(&self) -> usize {
        self.accelerometer.len() + self.gyroscope.len()
    }
}

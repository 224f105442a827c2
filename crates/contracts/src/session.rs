//! WorkoutSession - the value handed from capture to batching to persistence
//!
//! A session has exactly one owner at a time and is moved between stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MotionSeries;

/// User-entered description of a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutInfo {
    /// When the workout was defined
    pub date: DateTime<Utc>,

    pub username: String,

    /// Movement name (e.g. "Back Squat")
    pub movement: String,

    pub rounds: u32,

    pub reps: u32,

    /// Load in lbs, absent for bodyweight movements
    #[serde(default)]
    pub weight: Option<f64>,

    #[serde(default)]
    pub notes: Option<String>,

    /// Whether the user flagged the capture as usable for analysis
    #[serde(default)]
    pub is_data_good: bool,
}

impl Default for WorkoutInfo {
    fn default() -> Self {
        Self {
            date: Utc::now(),
            username: String::new(),
            movement: "Back Squat".to_string(),
            rounds: 0,
            reps: 0,
            weight: None,
            notes: None,
            is_data_good: false,
        }
    }
}

/// One captured workout: description plus motion data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: Uuid,

    #[serde(default)]
    pub info: WorkoutInfo,

    #[serde(default)]
    pub series: MotionSeries,
}

impl WorkoutSession {
    /// Start a session with a fresh id and no data
    pub fn new(info: WorkoutInfo) -> Self {
        Self {
            id: Uuid::new_v4(),
            info,
            series: MotionSeries::default(),
        }
    }

    /// Wrap an already captured series
    pub fn from_series(info: WorkoutInfo, series: MotionSeries) -> Self {
        Self {
            id: Uuid::new_v4(),
            info,
            series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sample;

    #[test]
    fn test_session_json_round_trip() {
        let info = WorkoutInfo {
            username: "athlete".to_string(),
            movement: "Front Squat".to_string(),
            rounds: 3,
            reps: 10,
            weight: Some(135.0),
            notes: Some("2 min rest between rounds".to_string()),
            is_data_good: true,
            ..Default::default()
        };
        let series = MotionSeries::new(vec![Sample::new(1.0, 0.1, 0.2, 0.3)], vec![]);
        let session = WorkoutSession::from_series(info, series);

        let json = serde_json::to_string(&session).unwrap();
        let back: WorkoutSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn test_new_sessions_get_distinct_ids() {
        let a = WorkoutSession::new(WorkoutInfo::default());
        let b = WorkoutSession::new(WorkoutInfo::default());
        assert_ne!(a.id, b.id);
        assert!(a.series.is_empty());
    }
}

//! Recorded session input.

use std::path::Path;

use contracts::{MotionSeries, WorkoutInfo, WorkoutSession};
use tracing::debug;

use crate::error::{CliError, Result};

/// Load a recording as a session.
///
/// Accepts a serialized `WorkoutSession`, or a bare `MotionSeries` which is
/// wrapped in a new session with default workout info.
pub fn load_session(path: &Path) -> Result<WorkoutSession> {
    if !path.is_file() {
        return Err(CliError::input_not_found(path));
    }
    let text = std::fs::read_to_string(path)?;
    parse_session(path, &text)
}

fn parse_session(path: &Path, text: &str) -> Result<WorkoutSession> {
    match serde_json::from_str::<WorkoutSession>(text) {
        Ok(session) => {
            debug!(session_id = %session.id, "input is a workout session");
            Ok(session)
        }
        Err(session_err) => {
            let series: MotionSeries = serde_json::from_str(text).map_err(|series_err| {
                CliError::input_parse(
                    path,
                    format!("not a session ({session_err}) nor a series ({series_err})"),
                )
            })?;
            debug!("input is a bare motion series");
            Ok(WorkoutSession::from_series(WorkoutInfo::default(), series))
        }
    }
}

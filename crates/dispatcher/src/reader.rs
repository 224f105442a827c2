//! Read persisted sessions back from a FileSink directory

use std::fs;
use std::path::{Path, PathBuf};

use contracts::{BatchRecord, MotionSeries, SessionRecord};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::{DispatcherError, Result};
use crate::sinks::file::{session_dir, BATCH_DIR, SESSION_FILE};

/// A session record with its batch records
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub session: SessionRecord,
    /// Ordered by batch number
    pub batches: Vec<BatchRecord>,
}

impl StoredSession {
    /// Build from records in any order
    pub fn new(session: SessionRecord, mut batches: Vec<BatchRecord>) -> Self {
        batches.sort_by_key(|b| b.batch_number);
        Self { session, batches }
    }

    /// True when every batch the session record announces is present
    pub fn is_complete(&self) -> bool {
        self.batches.len() == self.session.number_of_batches
    }

    /// Concatenate the batches into one series carrying the session rates
    pub fn reassemble(&self) -> MotionSeries {
        let mut series = MotionSeries {
            accelerometer_rate: self.session.accelerometer_rate,
            gyroscope_rate: self.session.gyroscope_rate,
            ..Default::default()
        };
        for batch in &self.batches {
            series.accelerometer.extend_from_slice(&batch.accelerometer);
            series.gyroscope.extend_from_slice(&batch.gyroscope);
        }
        series
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| DispatcherError::MalformedRecord {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a session and all of its batches from `base`
///
/// # Errors
/// - `SessionNotFound` if there is no `session.json` for this id
/// - `MalformedRecord` if any record fails to parse
#[instrument(name = "read_session", skip(base), fields(base = %base.display()))]
pub fn read_session(base: &Path, session_id: Uuid) -> Result<StoredSession> {
    let dir = session_dir(base, session_id);
    let session_path = dir.join(SESSION_FILE);
    if !session_path.is_file() {
        return Err(DispatcherError::SessionNotFound {
            session_id,
            base: base.to_path_buf(),
        });
    }
    let session: SessionRecord = read_json(&session_path)?;

    let batch_dir = dir.join(BATCH_DIR);
    let mut batches = Vec::new();
    if batch_dir.is_dir() {
        let mut paths: Vec<PathBuf> = fs::read_dir(&batch_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        for path in paths {
            batches.push(read_json::<BatchRecord>(&path)?);
        }
    }

    let stored = StoredSession::new(session, batches);
    if !stored.is_complete() {
        warn!(
            expected = stored.session.number_of_batches,
            found = stored.batches.len(),
            "session is missing batches"
        );
    }
    debug!(batches = stored.batches.len(), "session loaded");
    Ok(stored)
}

/// Session records of every session under `base`, oldest first
pub fn list_sessions(base: &Path) -> Result<Vec<SessionRecord>> {
    let mut sessions = Vec::new();
    if !base.is_dir() {
        return Ok(sessions);
    }
    for entry in fs::read_dir(base)? {
        let path = entry?.path().join(SESSION_FILE);
        if path.is_file() {
            sessions.push(read_json::<SessionRecord>(&path)?);
        }
    }
    sessions.sort_by_key(|s| s.created);
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Sample, WorkoutInfo};
    use tempfile::tempdir;

    fn session_record(id: Uuid, batches: usize) -> SessionRecord {
        SessionRecord {
            session_id: id,
            created: chrono::Utc::now(),
            info: WorkoutInfo::default(),
            start_time: Some(0.0),
            end_time: Some(1.0),
            number_of_batches: batches,
            accelerometer_rate: Some(50),
            gyroscope_rate: Some(25),
            accelerometer_entries: 2,
            gyroscope_entries: 0,
        }
    }

    fn batch_record(id: Uuid, n: usize) -> BatchRecord {
        let t = n as f64;
        BatchRecord {
            session_id: id,
            batch_number: n,
            start_time: t,
            end_time: t,
            accelerometer_rate: Some(50),
            gyroscope_rate: Some(25),
            accelerometer: vec![Sample::new(t, 0.0, 0.0, -1.0)],
            gyroscope: vec![],
        }
    }

    #[test]
    fn test_stored_session_orders_batches() {
        let id = Uuid::new_v4();
        let stored = StoredSession::new(
            session_record(id, 2),
            vec![batch_record(id, 2), batch_record(id, 1)],
        );
        assert!(stored.is_complete());
        let series = stored.reassemble();
        assert_eq!(series.accelerometer[0].timestamp, 1.0);
        assert_eq!(series.accelerometer[1].timestamp, 2.0);
        assert_eq!(series.gyroscope_rate, Some(25));
    }

    #[test]
    fn test_read_missing_session() {
        let dir = tempdir().unwrap();
        let err = read_session(dir.path(), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DispatcherError::SessionNotFound { .. }));
    }

    #[test]
    fn test_read_malformed_batch() {
        let dir = tempdir().unwrap();
        let id = Uuid::new_v4();
        let session_path = session_dir(dir.path(), id);
        fs::create_dir_all(session_path.join(BATCH_DIR)).unwrap();
        fs::write(
            session_path.join(SESSION_FILE),
            serde_json::to_string(&session_record(id, 1)).unwrap(),
        )
        .unwrap();
        fs::write(session_path.join(BATCH_DIR).join("1.json"), "{not json").unwrap();

        let err = read_session(dir.path(), id).unwrap_err();
        assert!(matches!(err, DispatcherError::MalformedRecord { .. }));
    }

    #[test]
    fn test_list_sessions_empty_base() {
        let dir = tempdir().unwrap();
        assert!(list_sessions(&dir.path().join("missing")).unwrap().is_empty());
    }
}

//! MemorySink - keeps records in a shared in-process store

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use contracts::{BatchRecord, BatchSink, ContractError, SessionRecord};
use tracing::debug;
use uuid::Uuid;

use crate::reader::StoredSession;

#[derive(Debug, Default)]
struct Entry {
    session: Option<SessionRecord>,
    batches: Vec<BatchRecord>,
}

/// Shared store behind one or more memory sinks
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<Uuid, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Entry>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Session with its batches, once the session record has arrived
    pub fn get(&self, session_id: Uuid) -> Option<StoredSession> {
        let store = self.lock();
        let entry = store.get(&session_id)?;
        let session = entry.session.clone()?;
        Some(StoredSession::new(session, entry.batches.clone()))
    }

    pub fn session_ids(&self) -> Vec<Uuid> {
        self.lock().keys().copied().collect()
    }

    /// Batch records held for all sessions
    pub fn batch_count(&self) -> usize {
        self.lock().values().map(|e| e.batches.len()).sum()
    }
}

/// Sink that records into a [`MemoryStore`]
pub struct MemorySink {
    name: String,
    store: MemoryStore,
}

impl MemorySink {
    pub fn new(name: impl Into<String>, store: MemoryStore) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

impl BatchSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write_session(&mut self, record: &SessionRecord) -> Result<(), ContractError> {
        self.store
            .lock()
            .entry(record.session_id)
            .or_default()
            .session = Some(record.clone());
        Ok(())
    }

    async fn write_batch(&mut self, record: &BatchRecord) -> Result<(), ContractError> {
        self.store
            .lock()
            .entry(record.session_id)
            .or_default()
            .batches
            .push(record.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, sessions = self.store.session_ids().len(), "MemorySink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::WorkoutInfo;

    #[tokio::test]
    async fn test_memory_sink_collects_by_session() {
        let store = MemoryStore::new();
        let mut sink = MemorySink::new("mem", store.clone());
        let id = Uuid::new_v4();

        let batch = BatchRecord {
            session_id: id,
            batch_number: 1,
            start_time: 0.0,
            end_time: 0.0,
            accelerometer_rate: None,
            gyroscope_rate: None,
            accelerometer: vec![],
            gyroscope: vec![],
        };
        sink.write_batch(&batch).await.unwrap();
        assert!(store.get(id).is_none());

        let session = SessionRecord {
            session_id: id,
            created: chrono::Utc::now(),
            info: WorkoutInfo::default(),
            start_time: None,
            end_time: None,
            number_of_batches: 1,
            accelerometer_rate: None,
            gyroscope_rate: None,
            accelerometer_entries: 0,
            gyroscope_entries: 0,
        };
        sink.write_session(&session).await.unwrap();

        let stored = store.get(id).unwrap();
        assert!(stored.is_complete());
        assert_eq!(store.batch_count(), 1);
        assert_eq!(sink.store().session_ids(), vec![id]);
    }
}

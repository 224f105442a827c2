//! Session and batch records built from a batched session

use std::sync::Arc;

use batcher::session_span;
use chrono::Utc;
use contracts::{BatchRecord, MotionBatch, SessionRecord, WorkoutSession};

/// One record routed to a sink
#[derive(Debug, Clone)]
pub enum SinkMessage {
    Session(Arc<SessionRecord>),
    Batch(Arc<BatchRecord>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Session,
    Batch,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Session => "session",
            RecordKind::Batch => "batch",
        }
    }
}

impl SinkMessage {
    pub fn kind(&self) -> RecordKind {
        match self {
            SinkMessage::Session(_) => RecordKind::Session,
            SinkMessage::Batch(_) => RecordKind::Batch,
        }
    }
}

/// Build the parent record and one child record per batch.
///
/// Session start/end cover the whole series; each batch record carries the
/// span of its own samples. Batch numbers are 1-based.
pub fn build_records(
    session: &WorkoutSession,
    batches: &[MotionBatch],
) -> (SessionRecord, Vec<BatchRecord>) {
    let series = &session.series;
    let span = session_span(series);

    let records: Vec<BatchRecord> = batches
        .iter()
        .map(|batch| {
            let batch_span = session_span(&batch.data);
            BatchRecord {
                session_id: session.id,
                batch_number: batch.batch_number(),
                start_time: batch_span.start.unwrap_or_default(),
                end_time: batch_span.end.unwrap_or_default(),
                accelerometer_rate: batch.data.accelerometer_rate,
                gyroscope_rate: batch.data.gyroscope_rate,
                accelerometer: batch.data.accelerometer.clone(),
                gyroscope: batch.data.gyroscope.clone(),
            }
        })
        .collect();

    let parent = SessionRecord {
        session_id: session.id,
        created: Utc::now(),
        info: session.info.clone(),
        start_time: span.start,
        end_time: span.end,
        number_of_batches: records.len(),
        accelerometer_rate: series.accelerometer_rate,
        gyroscope_rate: series.gyroscope_rate,
        accelerometer_entries: records.iter().map(|r| r.accelerometer.len()).sum(),
        gyroscope_entries: records.iter().map(|r| r.gyroscope.len()).sum(),
    };

    (parent, records)
}

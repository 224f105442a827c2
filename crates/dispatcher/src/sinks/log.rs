//! LogSink - logs record summaries via tracing

use contracts::{BatchRecord, BatchSink, ContractError, SessionRecord};
use tracing::{info, instrument};

/// Sink that logs record summaries for debugging
pub struct LogSink {
    name: String,
    batches: u64,
    entries: u64,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches: 0,
            entries: 0,
        }
    }
}

impl BatchSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write_session(&mut self, record: &SessionRecord) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            session_id = %record.session_id,
            movement = %record.info.movement,
            batches = record.number_of_batches,
            accelerometer = record.accelerometer_entries,
            gyroscope = record.gyroscope_entries,
            start = ?record.start_time,
            end = ?record.end_time,
            "Session record"
        );
        Ok(())
    }

    #[instrument(
        name = "log_sink_write_batch",
        skip(self, record),
        fields(sink = %self.name, batch_number = record.batch_number)
    )]
    async fn write_batch(&mut self, record: &BatchRecord) -> Result<(), ContractError> {
        self.batches += 1;
        self.entries += record.entries() as u64;
        info!(
            sink = %self.name,
            batch_number = record.batch_number,
            accelerometer = record.accelerometer.len(),
            gyroscope = record.gyroscope.len(),
            start = record.start_time,
            end = record.end_time,
            "Batch record"
        );
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            batches = self.batches,
            entries = self.entries,
            "LogSink closed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Sample;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_log_sink_counts_batches() {
        let mut sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");

        let record = BatchRecord {
            session_id: Uuid::nil(),
            batch_number: 1,
            start_time: 0.0,
            end_time: 0.02,
            accelerometer_rate: Some(50),
            gyroscope_rate: Some(25),
            accelerometer: vec![Sample::new(0.0, 0.0, 0.0, -1.0), Sample::new(0.02, 0.0, 0.0, -1.0)],
            gyroscope: vec![Sample::new(0.01, 0.1, 0.0, 0.0)],
        };
        sink.write_batch(&record).await.unwrap();
        sink.close().await.unwrap();

        assert_eq!(sink.batches, 1);
        assert_eq!(sink.entries, 3);
    }
}

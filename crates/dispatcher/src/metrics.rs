//! Per-sink counters, mirrored into `motion_dispatch_records_total`

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering::Relaxed};

use crate::records::RecordKind;

/// Counters for a single sink worker
#[derive(Debug)]
pub struct SinkMetrics {
    sink: String,
    queued: AtomicUsize,
    sessions_written: AtomicU64,
    batches_written: AtomicU64,
    failed: AtomicU64,
}

impl SinkMetrics {
    pub fn new(sink: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            queued: AtomicUsize::new(0),
            sessions_written: AtomicU64::new(0),
            batches_written: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn set_queued(&self, depth: usize) {
        self.queued.store(depth, Relaxed);
    }

    /// Count one record handed to the sink
    pub fn record(&self, kind: RecordKind, ok: bool) {
        let counter = match (ok, kind) {
            (false, _) => &self.failed,
            (true, RecordKind::Session) => &self.sessions_written,
            (true, RecordKind::Batch) => &self.batches_written,
        };
        counter.fetch_add(1, Relaxed);

        metrics::counter!(
            "motion_dispatch_records_total",
            "sink" => self.sink.clone(),
            "kind" => kind.as_str(),
            "status" => if ok { "ok" } else { "error" }
        )
        .increment(1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queued.load(Relaxed),
            sessions_written: self.sessions_written.load(Relaxed),
            batches_written: self.batches_written.load(Relaxed),
            failure_count: self.failed.load(Relaxed),
        }
    }
}

/// Point-in-time copy of [`SinkMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub sessions_written: u64,
    pub batches_written: u64,
    pub failure_count: u64,
}

impl MetricsSnapshot {
    /// Records written successfully
    pub fn written(&self) -> u64 {
        self.sessions_written + self.batches_written
    }
}

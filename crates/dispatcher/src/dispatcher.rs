//! Dispatcher - fans session and batch records out to every sink

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use contracts::{MotionBatch, SessionRecord, SinkConfig, SinkType, WorkoutSession};

use crate::error::{DispatcherError, Result};
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::records::{build_records, SinkMessage};
use crate::sinks::{FileSink, LogSink, MemorySink, MemoryStore};

/// Per-sink outcome after shutdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReport {
    pub name: String,
    pub metrics: MetricsSnapshot,
}

/// Builds sink handles from configuration
pub struct DispatcherBuilder {
    sinks: Vec<SinkConfig>,
    memory: MemoryStore,
}

impl DispatcherBuilder {
    pub fn new(sinks: Vec<SinkConfig>) -> Self {
        Self {
            sinks,
            memory: MemoryStore::new(),
        }
    }

    /// Back every memory sink with this store
    pub fn with_memory_store(mut self, store: MemoryStore) -> Self {
        self.memory = store;
        self
    }

    /// Create every sink and spawn its worker
    #[instrument(name = "dispatcher_builder_build", skip(self), fields(sink_count = self.sinks.len()))]
    pub fn build(self) -> Result<Dispatcher> {
        let mut handles = Vec::with_capacity(self.sinks.len());
        for sink_config in &self.sinks {
            handles.push(create_sink_handle(sink_config, &self.memory)?);
        }
        Ok(Dispatcher {
            handles,
            memory: self.memory,
        })
    }
}

#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config, memory),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(config: &SinkConfig, memory: &MemoryStore) -> Result<SinkHandle> {
    let handle = match config.sink_type {
        SinkType::Log => SinkHandle::spawn(LogSink::new(&config.name), config.queue_capacity),
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            SinkHandle::spawn(sink, config.queue_capacity)
        }
        SinkType::Memory => SinkHandle::spawn(
            MemorySink::new(&config.name, memory.clone()),
            config.queue_capacity,
        ),
    };
    debug!(sink = %config.name, "sink worker spawned");
    Ok(handle)
}

/// Record fan-out to a set of sink workers
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    memory: MemoryStore,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self {
            handles,
            memory: MemoryStore::new(),
        }
    }

    /// Store shared by memory sinks built from configuration
    pub fn memory_store(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn sink_count(&self) -> usize {
        self.handles.len()
    }

    /// Current metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Build records for a batched session and queue them on every sink.
    ///
    /// The session record goes first, then batches in order. Waits for
    /// queue capacity; nothing is dropped. Returns the session record.
    #[instrument(
        name = "dispatcher_persist",
        skip(self, session, batches),
        fields(session_id = %session.id, batches = batches.len())
    )]
    pub async fn persist(&self, session: &WorkoutSession, batches: &[MotionBatch]) -> SessionRecord {
        let (parent, children) = build_records(session, batches);
        let parent = Arc::new(parent);

        self.dispatch(SinkMessage::Session(Arc::clone(&parent))).await;
        for child in children {
            self.dispatch(SinkMessage::Batch(Arc::new(child))).await;
        }

        info!(
            sinks = self.handles.len(),
            batches = parent.number_of_batches,
            "session queued for persistence"
        );
        Arc::unwrap_or_clone(parent)
    }

    async fn dispatch(&self, message: SinkMessage) {
        for handle in &self.handles {
            if !handle.send(message.clone()).await {
                warn!(sink = %handle.name(), kind = message.kind().as_str(), "record not delivered");
            }
        }
    }

    /// Drain every queue, then flush and close every sink
    #[instrument(name = "dispatcher_shutdown", skip(self))]
    pub async fn shutdown(self) -> Vec<SinkReport> {
        let mut reports = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            let name = handle.name().to_string();
            let metrics = Arc::clone(handle.metrics());
            handle.shutdown().await;
            reports.push(SinkReport {
                name,
                metrics: metrics.snapshot(),
            });
        }
        info!(sinks = reports.len(), "Dispatcher shutdown complete");
        reports
    }
}

/// Convenience function to create a dispatcher from sink configs
pub fn create_dispatcher(sink_configs: Vec<SinkConfig>) -> Result<Dispatcher> {
    DispatcherBuilder::new(sink_configs).build()
}

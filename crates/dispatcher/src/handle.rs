//! SinkHandle - one sink behind its own queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use contracts::BatchSink;

use crate::metrics::SinkMetrics;
use crate::records::SinkMessage;

/// Handle to a running sink worker
pub struct SinkHandle {
    name: String,
    tx: mpsc::Sender<SinkMessage>,
    metrics: Arc<SinkMetrics>,
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Spawn the worker task for `sink`
    pub fn spawn<S: BatchSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new(name.clone()));

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();
        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Queue a record, waiting for capacity
    ///
    /// Records are never dropped for a full queue. Returns false only if
    /// the worker has exited.
    pub async fn send(&self, message: SinkMessage) -> bool {
        let kind = message.kind();
        match self.tx.send(message).await {
            Ok(()) => {
                self.metrics
                    .set_queued(self.tx.max_capacity() - self.tx.capacity());
                true
            }
            Err(_) => {
                self.metrics.record(kind, false);
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                false
            }
        }
    }

    /// Close the queue and wait for the worker to flush and close the sink
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

#[instrument(name = "sink_worker_loop", skip(sink, rx, metrics), fields(sink = %name))]
async fn sink_worker<S: BatchSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<SinkMessage>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Some(message) = rx.recv().await {
        metrics.set_queued(rx.len());

        let result = match &message {
            SinkMessage::Session(record) => sink.write_session(record).await,
            SinkMessage::Batch(record) => sink.write_batch(record).await,
        };
        metrics.record(message.kind(), result.is_ok());
        if let Err(e) = result {
            error!(sink = %name, kind = message.kind().as_str(), error = %e, "Write failed");
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}

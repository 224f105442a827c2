//! # Dispatcher
//!
//! Persists batched sessions.
//!
//! Responsibilities:
//! - Build one `SessionRecord` and one `BatchRecord` per batch
//! - Fan records out to every configured sink, each behind its own queue
//! - Isolate failing sinks, never drop records
//! - Read persisted sessions back and reassemble the series

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod reader;
pub mod records;
pub mod sinks;

pub use contracts::{BatchRecord, BatchSink, SessionRecord};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, SinkReport};
pub use error::{DispatcherError, Result};
pub use handle::SinkHandle;
pub use reader::{list_sessions, read_session, StoredSession};
pub use records::{build_records, RecordKind, SinkMessage};
pub use self::metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{session_dir, FileSink, FileSinkConfig, LogSink, MemorySink, MemoryStore};

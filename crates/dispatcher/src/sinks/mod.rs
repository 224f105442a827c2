//! Sink implementations
//!
//! Contains FileSink, LogSink, and MemorySink.

pub(crate) mod file;
mod log;
mod memory;

pub use self::file::{session_dir, FileSink, FileSinkConfig};
pub use self::log::LogSink;
pub use self::memory::{MemorySink, MemoryStore};

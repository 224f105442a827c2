//! BatchSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for persistence sinks.

use crate::{BatchRecord, ContractError, SessionRecord};

/// Record output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(BatchSink: Send)]
pub trait LocalBatchSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write the parent session record
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write_session(&mut self, record: &SessionRecord) -> Result<(), ContractError>;

    /// Write one batch record
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write_batch(&mut self, record: &BatchRecord) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}

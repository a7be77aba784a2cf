//! Sink trait - Dispatcher output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{ContractError, LogRecord};

/// Log output trait
///
/// All sink implementations must implement this trait. Sinks are owned by
/// the dispatcher worker and invoked in registration order.
pub trait Sink: Send {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one formatted record
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn log(&mut self, record: &LogRecord) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    fn flush(&mut self) -> Result<(), ContractError>;
}

//! Formatter trait - renders a record before it reaches the sinks

use crate::{ContractError, LogRecord};

/// Record renderer
///
/// Called on the dispatcher worker thread only. Implementations write into
/// `record.formatted`, replacing whatever was there.
pub trait Formatter: Send + Sync {
    /// Render `record` in place
    ///
    /// # Errors
    /// Returns a format error; the dispatcher captures it and moves on
    fn format(&self, record: &mut LogRecord) -> Result<(), ContractError>;
}

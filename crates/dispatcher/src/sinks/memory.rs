//! MemorySink - keeps formatted lines in memory

use std::sync::Arc;

use contracts::{ContractError, LogRecord, Sink};
use parking_lot::Mutex;

/// Sink that appends every formatted line to a shared buffer
///
/// Cloning the sink shares the buffer, so one clone can be handed to the
/// dispatcher while another is kept to read the output.
#[derive(Clone)]
pub struct MemorySink {
    name: String,
    lines: Arc<Mutex<Vec<String>>>,
    flushes: Arc<Mutex<usize>>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Arc::new(Mutex::new(Vec::new())),
            flushes: Arc::new(Mutex::new(0)),
        }
    }

    /// Copy of everything written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// How many times `flush` has been called
    pub fn flush_count(&self) -> usize {
        *self.flushes.lock()
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&mut self, record: &LogRecord) -> Result<(), ContractError> {
        self.lines.lock().push(record.formatted.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        *self.flushes.lock() += 1;
        Ok(())
    }
}

//! LogSink - re-emits records through tracing

use contracts::{ContractError, Level, LogRecord, Sink};
use tracing::{debug, error, info, instrument, trace, warn};

/// Sink that forwards formatted records to the tracing subscriber
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn emit(&self, record: &LogRecord) {
        let line = if record.formatted.is_empty() {
            record.raw.as_str()
        } else {
            record.formatted.as_str()
        };
        let logger = record.logger_name.as_str();

        match record.level {
            Level::Trace => trace!(sink = %self.name, logger, "{line}"),
            Level::Debug => debug!(sink = %self.name, logger, "{line}"),
            Level::Info => info!(sink = %self.name, logger, "{line}"),
            Level::Warn => warn!(sink = %self.name, logger, "{line}"),
            Level::Error | Level::Critical => error!(sink = %self.name, logger, "{line}"),
            Level::Off => {}
        }
    }
}

impl Sink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&mut self, record: &LogRecord) -> Result<(), ContractError> {
        self.emit(record);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }
}

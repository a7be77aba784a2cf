//! PlainFormatter - single line text

use std::fmt::Write;

use contracts::{ContractError, Formatter, LogRecord};

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Renders `[time] [logger] [level] message`
#[derive(Debug, Clone)]
pub struct PlainFormatter {
    time_format: String,
}

impl PlainFormatter {
    pub fn new() -> Self {
        Self {
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }

    /// Use a custom `chrono` strftime pattern for the timestamp
    pub fn with_time_format(time_format: impl Into<String>) -> Self {
        Self {
            time_format: time_format.into(),
        }
    }
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for PlainFormatter {
    fn format(&self, record: &mut LogRecord) -> Result<(), ContractError> {
        let mut out = String::with_capacity(record.raw.len() + 48);
        write!(
            out,
            "[{}] [{}] [{}] {}",
            record.time.format(&self.time_format),
            record.logger_name,
            record.level,
            record.raw
        )
        .map_err(|e| ContractError::format(format!("invalid time format: {e}")))?;
        record.formatted = out;
        Ok(())
    }
}

//! LogRecord - the caller-owned structured log entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ContractError;

/// Severity level, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Critical,
    Off,
}

impl Level {
    /// Lowercase name used by formatters
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Critical => "critical",
            Level::Off => "off",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" | "err" => Ok(Level::Error),
            "critical" => Ok(Level::Critical),
            "off" => Ok(Level::Off),
            other => Err(ContractError::Other(format!("unknown level '{other}'"))),
        }
    }
}

/// Structured log record
///
/// `raw` holds the message as emitted by the caller; `formatted` is the
/// rendered representation a [`Formatter`](crate::Formatter) writes and a
/// [`Sink`](crate::Sink) reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Name of the emitting logger
    pub logger_name: String,

    /// Severity
    pub level: Level,

    /// Wall-clock time the record was emitted
    pub time: DateTime<Utc>,

    /// Message payload
    pub raw: String,

    /// Rendered output, empty until formatted
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub formatted: String,
}

impl LogRecord {
    /// Create a record stamped with the current time
    pub fn new(logger_name: impl Into<String>, level: Level, raw: impl Into<String>) -> Self {
        Self {
            logger_name: logger_name.into(),
            level,
            time: Utc::now(),
            raw: raw.into(),
            formatted: String::new(),
        }
    }

    /// Override the timestamp
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    /// Reset every field, keeping the allocated buffers
    pub fn clear(&mut self) {
        self.logger_name.clear();
        self.level = Level::default();
        self.time = DateTime::<Utc>::default();
        self.raw.clear();
        self.formatted.clear();
    }
}

//! TransportRecord - the owned copy of a log entry that crosses into the worker

use chrono::{DateTime, Utc};
use contracts::{Level, LogRecord};

/// Self-contained, move-only copy of a [`LogRecord`]
///
/// Built on the producer thread, moved through the queue, consumed on the
/// worker. Every field is an owned copy, so the caller's record can be
/// dropped as soon as `submit` returns.
///
/// The type deliberately has no `Clone`; duplicating a record in flight is a
/// compile error:
///
/// ```compile_fail
/// use dispatcher::TransportRecord;
///
/// let record = TransportRecord::default();
/// let copy = record.clone();
/// ```
///
/// Taking the value out of a slot leaves an empty record behind:
///
/// ```
/// use contracts::{Level, LogRecord};
/// use dispatcher::TransportRecord;
///
/// let mut slot = TransportRecord::from(&LogRecord::new("app", Level::Info, "hello"));
/// let taken = std::mem::take(&mut slot);
/// assert!(slot.is_empty());
/// assert_eq!(taken.payload(), "hello");
/// ```
#[derive(Debug, Default)]
pub struct TransportRecord {
    logger_name: String,
    level: Level,
    time: DateTime<Utc>,
    payload: String,
}

impl TransportRecord {
    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// True for a default or moved-from record
    pub fn is_empty(&self) -> bool {
        self.logger_name.is_empty() && self.payload.is_empty()
    }

    /// Write this record's fields into `record`, overwriting what was there
    ///
    /// Any previous `formatted` output is discarded.
    pub fn fill_log_record(self, record: &mut LogRecord) {
        record.clear();
        record.logger_name = self.logger_name;
        record.level = self.level;
        record.time = self.time;
        record.raw = self.payload;
    }

    /// Rebuild a fresh [`LogRecord`]
    pub fn into_log_record(self) -> LogRecord {
        let mut record = LogRecord::default();
        self.fill_log_record(&mut record);
        record
    }
}

impl From<&LogRecord> for TransportRecord {
    fn from(record: &LogRecord) -> Self {
        Self {
            logger_name: record.logger_name.clone(),
            level: record.level,
            time: record.time,
            payload: record.raw.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LogRecord {
        LogRecord::new("net", Level::Warn, "connection reset")
    }

    #[test]
    fn test_copies_every_field() {
        let original = sample();
        let transport = TransportRecord::from(&original);
        drop(original);

        assert_eq!(transport.logger_name(), "net");
        assert_eq!(transport.level(), Level::Warn);
        assert_eq!(transport.payload(), "connection reset");
    }

    #[test]
    fn test_fill_overwrites_previous_content() {
        let original = sample();
        let transport = TransportRecord::from(&original);

        let mut target = LogRecord::new("stale", Level::Trace, "old message");
        target.formatted.push_str("[trace] old message");
        transport.fill_log_record(&mut target);

        assert_eq!(target.logger_name, "net");
        assert_eq!(target.level, Level::Warn);
        assert_eq!(target.time, original.time);
        assert_eq!(target.raw, "connection reset");
        assert!(target.formatted.is_empty());
    }

    #[test]
    fn test_take_leaves_empty_record() {
        let mut slot = TransportRecord::from(&sample());
        assert!(!slot.is_empty());

        let moved = std::mem::take(&mut slot);
        assert!(slot.is_empty());
        assert_eq!(slot.payload(), "");
        assert_eq!(moved.payload(), "connection reset");
    }

    #[test]
    fn test_round_trip_matches_source() {
        let original = sample();
        let rebuilt = TransportRecord::from(&original).into_log_record();
        assert_eq!(rebuilt, original);
    }
}

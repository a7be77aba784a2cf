//! JsonFormatter - one JSON object per record

use chrono::{DateTime, Utc};
use contracts::{ContractError, Formatter, Level, LogRecord};
use serde::Serialize;

#[derive(Serialize)]
struct JsonLine<'a> {
    time: &'a DateTime<Utc>,
    logger: &'a str,
    level: Level,
    message: &'a str,
}

/// Renders `{"time":..,"logger":..,"level":..,"message":..}`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &mut LogRecord) -> Result<(), ContractError> {
        let line = JsonLine {
            time: &record.time,
            logger: &record.logger_name,
            level: record.level,
            message: &record.raw,
        };
        let rendered = serde_json::to_string(&line)
            .map_err(|e| ContractError::format(format!("json error: {e}")))?;
        record.formatted = rendered;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_fields() {
        let mut record = LogRecord::new("http", Level::Warn, "slow \"request\"");
        JsonFormatter::new().format(&mut record).unwrap();

        let value: serde_json::Value = serde_json::from_str(&record.formatted).unwrap();
        assert_eq!(value["logger"], "http");
        assert_eq!(value["level"], "warn");
        assert_eq!(value["message"], "slow \"request\"");
        assert!(value["time"].is_string());
    }
}

//! FileSink - appends formatted lines to a file

use contracts::{ContractError, LogRecord, Sink};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output file
    pub path: PathBuf,
    /// Append to an existing file instead of truncating it
    pub append: bool,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let path = params
            .get("path")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| "missing 'path' parameter".to_string())?;

        let append = match params.get("append").map(String::as_str) {
            Some("true") | None => true,
            Some("false") => false,
            Some(other) => return Err(format!("invalid append flag '{}'", other)),
        };

        Ok(Self { path, append })
    }
}

/// Sink that writes one formatted record per line
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a new FileSink, creating parent directories as needed
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(config.append)
            .truncate(!config.append)
            .open(&config.path)?;

        let name = name.into();
        debug!(sink = %name, path = %config.path.display(), "FileSink opened");

        Ok(Self {
            name,
            config,
            writer: BufWriter::new(file),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileSinkConfig::from_params(params)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        Self::new(name, config)
    }

    fn write_line(&mut self, record: &LogRecord) -> std::io::Result<()> {
        let line = if record.formatted.is_empty() {
            &record.raw
        } else {
            &record.formatted
        };
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&mut self, record: &LogRecord) -> Result<(), ContractError> {
        self.write_line(record).map_err(|e| {
            error!(sink = %self.name, path = %self.config.path.display(), error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }

    #[instrument(name = "file_sink_flush", skip(self), fields(sink = %self.name))]
    fn flush(&mut self) -> Result<(), ContractError> {
        self.writer
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Level;
    use tempfile::tempdir;

    fn formatted(raw: &str) -> LogRecord {
        let mut record = LogRecord::new("app", Level::Info, raw);
        record.formatted = format!("[info] {raw}");
        record
    }

    #[test]
    fn test_file_sink_write() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig {
            path: dir.path().join("nested").join("app.log"),
            append: true,
        };

        let mut sink = FileSink::new("test_file", config.clone()).unwrap();
        sink.log(&formatted("one")).unwrap();
        sink.log(&formatted("two")).unwrap();
        sink.flush().unwrap();

        let content = fs::read_to_string(&config.path).unwrap();
        assert_eq!(content, "[info] one\n[info] two\n");
    }

    #[test]
    fn test_truncate_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old\n").unwrap();

        let mut params = HashMap::new();
        params.insert("path".to_string(), path.display().to_string());
        params.insert("append".to_string(), "false".to_string());

        let mut sink = FileSink::from_params("file", &params).unwrap();
        sink.log(&formatted("new")).unwrap();
        sink.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[info] new\n");
    }

    #[test]
    fn test_config_rejects_bad_append() {
        let mut params = HashMap::new();
        params.insert("path".to_string(), "/tmp/x.log".to_string());
        params.insert("append".to_string(), "maybe".to_string());
        assert!(FileSinkConfig::from_params(&params).is_err());
    }
}

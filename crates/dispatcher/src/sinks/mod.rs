//! Sink implementations
//!
//! Contains LogSink, FileSink, NetworkSink and MemorySink, plus the factory
//! that builds them from configuration.

mod file;
mod log;
mod memory;
mod network;

pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;
pub use self::memory::MemorySink;
pub use self::network::{NetworkFormat, NetworkSink, NetworkSinkConfig};

use contracts::{Sink, SinkConfig, SinkType};
use tracing::instrument;

use crate::error::DispatcherError;

/// Create a sink from configuration
#[instrument(
    name = "dispatcher_create_sink",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub fn create_sink(config: &SinkConfig) -> Result<Box<dyn Sink>, DispatcherError> {
    match config.sink_type {
        SinkType::Log => Ok(Box::new(LogSink::new(&config.name))),
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(Box::new(sink))
        }
        SinkType::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(Box::new(sink))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_create_log_sink() {
        let config = SinkConfig {
            name: "console".to_string(),
            sink_type: SinkType::Log,
            params: HashMap::new(),
        };
        let sink = create_sink(&config).unwrap();
        assert_eq!(sink.name(), "console");
    }

    #[test]
    fn test_create_file_sink_without_path_fails() {
        let config = SinkConfig {
            name: "file".to_string(),
            sink_type: SinkType::File,
            params: HashMap::new(),
        };
        let err = create_sink(&config).err().unwrap();
        assert!(matches!(err, DispatcherError::SinkCreation { .. }));
    }
}

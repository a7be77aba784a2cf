//! Dispatcher error types

use thiserror::Error;

use crate::failure::WorkerFailure;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Invalid construction parameters
    #[error("invalid dispatcher configuration: {message}")]
    Config { message: String },

    /// Submit after shutdown began
    #[error("async logger is not active")]
    Inactive,

    /// A failure the worker captured while processing an earlier record
    #[error("prior async failure: {0}")]
    WorkerFailure(#[from] WorkerFailure),

    /// Queue full on a non-blocking submit
    #[error("queue full (capacity {capacity}), record rejected")]
    QueueFull { capacity: usize },

    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Sink or config error (from contract)
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// True when this error carries a failure from the worker thread
    pub fn is_worker_failure(&self) -> bool {
        matches!(self, Self::WorkerFailure(_))
    }
}

//! # Dispatcher
//!
//! Asynchronous log dispatch engine.
//!
//! Producers hand records to [`AsyncDispatcher`] and return immediately; a
//! single background worker formats each record and writes it to every sink:
//! - bounded FIFO queue, producers block with backoff when it is full
//! - worker failures are captured and reported on the next submit
//! - shutdown drains everything accepted before it

pub mod backoff;
pub mod dispatcher;
pub mod error;
pub mod failure;
pub mod formatters;
pub mod lifecycle;
pub mod metrics;
mod queue;
pub mod sinks;
pub mod transport;
mod worker;

pub use contracts::{Formatter, LogRecord, Sink};
pub use dispatcher::{
    create_dispatcher, AsyncDispatcher, DispatcherBuilder, DEFAULT_WORKER_NAME, MAX_QUEUE_CAPACITY,
};
pub use error::DispatcherError;
pub use failure::{FailureKind, WorkerFailure};
pub use formatters::{create_formatter, JsonFormatter, PlainFormatter};
pub use lifecycle::LifecycleState;
pub use metrics::DispatchMetrics;
pub use sinks::{create_sink, FileSink, LogSink, MemorySink, NetworkSink};
pub use transport::TransportRecord;

//! AsyncDispatcher - hands records to a background worker
//!
//! Producers call [`AsyncDispatcher::submit`]; a single dedicated thread
//! formats each record and writes it to every sink in registration order.
//! A full queue blocks the producer (with backoff) instead of dropping.

use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use contracts::{DispatchSnapshot, DispatcherSettings, Formatter, LogRecord, LoggerBlueprint, Sink};
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::backoff;
use crate::error::DispatcherError;
use crate::failure::FailureSlot;
use crate::formatters::{create_formatter, PlainFormatter, SharedFormatter};
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::metrics::DispatchMetrics;
use crate::queue::{handoff, EnqueueError, QueueProducer};
use crate::sinks::create_sink;
use crate::transport::TransportRecord;
use crate::worker::Worker;

/// Largest queue the underlying channel accepts
pub const MAX_QUEUE_CAPACITY: usize = usize::MAX >> 3;

/// Name given to the worker thread unless configured otherwise
pub const DEFAULT_WORKER_NAME: &str = "async-log-worker";

/// Builder for creating an AsyncDispatcher
pub struct DispatcherBuilder {
    queue_capacity: usize,
    worker_name: String,
    formatter: Option<Arc<dyn Formatter>>,
    sinks: Vec<Box<dyn Sink>>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            queue_capacity,
            worker_name: DEFAULT_WORKER_NAME.to_string(),
            formatter: None,
            sinks: Vec::new(),
        }
    }

    /// Start from dispatcher settings
    pub fn with_settings(settings: &DispatcherSettings) -> Self {
        Self::new(settings.queue_capacity).worker_name(settings.worker_name.clone())
    }

    /// Build formatter and sinks from a blueprint
    #[instrument(
        name = "dispatcher_builder_from_blueprint",
        skip(blueprint),
        fields(sink_count = blueprint.sinks.len())
    )]
    pub fn from_blueprint(blueprint: &LoggerBlueprint) -> Result<Self, DispatcherError> {
        let mut builder = Self::with_settings(&blueprint.dispatcher)
            .formatter(create_formatter(blueprint.formatter.kind));
        for sink_config in &blueprint.sinks {
            builder = builder.sink(create_sink(sink_config)?);
        }
        Ok(builder)
    }

    /// Set the worker thread name
    pub fn worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    /// Set the formatter (plain text if never called)
    pub fn formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Append a sink; sinks run in the order they are added
    pub fn sink(mut self, sink: Box<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Build and start the dispatcher
    pub fn build(self) -> Result<AsyncDispatcher, DispatcherError> {
        let formatter = self
            .formatter
            .unwrap_or_else(|| Arc::new(PlainFormatter::new()));
        AsyncDispatcher::spawn(formatter, self.sinks, self.queue_capacity, self.worker_name)
    }
}

/// Convenience function to create a dispatcher from a blueprint
pub fn create_dispatcher(blueprint: &LoggerBlueprint) -> Result<AsyncDispatcher, DispatcherError> {
    DispatcherBuilder::from_blueprint(blueprint)?.build()
}

/// The asynchronous dispatch engine
///
/// Dropping the dispatcher performs a full [`shutdown`](Self::shutdown).
pub struct AsyncDispatcher {
    producer: QueueProducer<TransportRecord>,
    formatter: Arc<SharedFormatter>,
    lifecycle: Arc<Lifecycle>,
    failure: Arc<FailureSlot>,
    metrics: Arc<DispatchMetrics>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
}

impl AsyncDispatcher {
    /// Start a dispatcher with the default worker name
    ///
    /// # Errors
    /// `Config` when `queue_capacity` is zero or too large, `Io` when the
    /// worker thread cannot be spawned.
    pub fn new(
        formatter: Arc<dyn Formatter>,
        sinks: Vec<Box<dyn Sink>>,
        queue_capacity: usize,
    ) -> Result<Self, DispatcherError> {
        Self::spawn(formatter, sinks, queue_capacity, DEFAULT_WORKER_NAME.to_string())
    }

    #[instrument(
        name = "dispatcher_spawn",
        skip(formatter, sinks),
        fields(sink_count = sinks.len())
    )]
    fn spawn(
        formatter: Arc<dyn Formatter>,
        sinks: Vec<Box<dyn Sink>>,
        queue_capacity: usize,
        worker_name: String,
    ) -> Result<Self, DispatcherError> {
        if queue_capacity == 0 {
            return Err(DispatcherError::config("queue capacity must be > 0"));
        }
        if queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(DispatcherError::config(format!(
                "queue capacity {queue_capacity} exceeds {MAX_QUEUE_CAPACITY}"
            )));
        }

        let (producer, consumer) = handoff(queue_capacity);
        let formatter = Arc::new(SharedFormatter::new(formatter));
        let lifecycle = Arc::new(Lifecycle::new());
        let failure = Arc::new(FailureSlot::default());
        let metrics = Arc::new(DispatchMetrics::new());
        let sink_count = sinks.len();

        let worker = Worker {
            consumer,
            formatter: Arc::clone(&formatter),
            sinks,
            lifecycle: Arc::clone(&lifecycle),
            failure: Arc::clone(&failure),
            metrics: Arc::clone(&metrics),
        };

        let handle = thread::Builder::new()
            .name(worker_name.clone())
            .spawn(move || worker.run())?;
        let worker_id = handle.thread().id();

        info!(
            capacity = queue_capacity,
            sinks = sink_count,
            worker = %worker_name,
            "Dispatcher started"
        );

        Ok(Self {
            producer,
            formatter,
            lifecycle,
            failure,
            metrics,
            worker: Mutex::new(Some(handle)),
            worker_id,
        })
    }

    /// Queue `record` for the worker, blocking while the queue is full
    ///
    /// # Errors
    /// - `WorkerFailure` if the worker failed on an earlier record; the
    ///   failure is cleared, so the next call proceeds normally
    /// - `Inactive` once shutdown has begun
    pub fn submit(&self, record: &LogRecord) -> Result<(), DispatcherError> {
        self.ensure_accepting()?;

        let record = TransportRecord::from(record);
        let mut pending = match self.producer.try_enqueue(record) {
            Ok(()) => {
                self.metrics.inc_submitted();
                return Ok(());
            }
            Err(EnqueueError::Full(record)) => record,
            Err(EnqueueError::Closed(_)) => return Err(DispatcherError::Inactive),
        };

        self.metrics.inc_backpressure_events();
        let blocked_since = Instant::now();
        loop {
            backoff::wait(blocked_since.elapsed());
            match self.producer.try_enqueue(pending) {
                Ok(()) => {
                    self.metrics.inc_submitted();
                    return Ok(());
                }
                Err(EnqueueError::Full(record)) => pending = record,
                Err(EnqueueError::Closed(_)) => return Err(DispatcherError::Inactive),
            }
        }
    }

    /// Queue `record` only if there is room right now
    ///
    /// # Errors
    /// Same as [`submit`](Self::submit), plus `QueueFull` instead of waiting.
    pub fn try_submit(&self, record: &LogRecord) -> Result<(), DispatcherError> {
        self.ensure_accepting()?;

        match self.producer.try_enqueue(TransportRecord::from(record)) {
            Ok(()) => {
                self.metrics.inc_submitted();
                Ok(())
            }
            Err(EnqueueError::Full(_)) => Err(DispatcherError::QueueFull {
                capacity: self.producer.capacity(),
            }),
            Err(EnqueueError::Closed(_)) => Err(DispatcherError::Inactive),
        }
    }

    /// Swap the formatter used for records the worker has not started yet
    pub fn reconfigure_formatter(&self, formatter: Arc<dyn Formatter>) {
        self.formatter.replace(formatter);
        debug!("Formatter replaced");
    }

    /// Stop accepting records, drain the queue and join the worker
    ///
    /// Blocks until every record accepted before this call has reached the
    /// sinks. Safe to call more than once; join problems are logged only.
    /// Called from the worker thread itself it only requests the stop, and a
    /// later call from another thread completes the join.
    #[instrument(name = "dispatcher_shutdown", skip(self))]
    pub fn shutdown(&self) {
        if self.lifecycle.begin_stopping() {
            info!(
                queued = self.producer.len(),
                "Dispatcher stopping, draining queue"
            );
        }
        if self.on_worker_thread() {
            return;
        }

        let mut worker = self.worker.lock();
        if let Some(handle) = worker.take() {
            self.join_worker(handle);
        }
    }

    /// Like [`shutdown`](Self::shutdown) but gives up after `timeout`
    ///
    /// Returns true if the worker exited in time. On timeout the dispatcher
    /// stays Stopping and a later `shutdown` can still complete the join.
    /// The timeout also bounds waiting for a concurrent `shutdown`.
    #[instrument(name = "dispatcher_shutdown_timeout", skip(self))]
    pub fn shutdown_timeout(&self, timeout: Duration) -> bool {
        self.lifecycle.begin_stopping();
        if self.on_worker_thread() {
            return false;
        }

        let started = Instant::now();
        let deadline = started + timeout;
        let Some(mut worker) = self.worker.try_lock_for(timeout) else {
            warn!("Another shutdown is still joining the worker");
            return false;
        };
        loop {
            let finished = match worker.as_ref() {
                None => return true,
                Some(handle) => handle.is_finished(),
            };
            if finished {
                if let Some(handle) = worker.take() {
                    self.join_worker(handle);
                }
                return true;
            }
            if Instant::now() >= deadline {
                warn!(
                    queued = self.producer.len(),
                    "Dispatcher worker still draining after timeout"
                );
                return false;
            }
            backoff::wait(started.elapsed());
        }
    }

    fn on_worker_thread(&self) -> bool {
        if thread::current().id() == self.worker_id {
            warn!("Shutdown called from the worker thread, not joining");
            return true;
        }
        false
    }

    fn join_worker(&self, handle: JoinHandle<()>) {
        if let Err(e) = handle.join() {
            error!(error = ?e, "Dispatcher worker panicked");
        }
        self.lifecycle.mark_stopped();
        debug!("Dispatcher shutdown complete");
    }

    fn ensure_accepting(&self) -> Result<(), DispatcherError> {
        if let Some(failure) = self.failure.take() {
            return Err(DispatcherError::WorkerFailure(failure));
        }
        if !self.lifecycle.is_running() {
            return Err(DispatcherError::Inactive);
        }
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Fixed queue capacity
    pub fn capacity(&self) -> usize {
        self.producer.capacity()
    }

    /// Get current metrics
    pub fn metrics(&self) -> DispatchSnapshot {
        self.metrics
            .snapshot(self.producer.len(), self.producer.capacity())
    }
}

impl Drop for AsyncDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

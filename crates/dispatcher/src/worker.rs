//! Worker loop - drains the queue and drives formatter and sinks

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use contracts::Sink;
use tracing::{debug, error, warn};

use crate::backoff;
use crate::failure::{FailureSlot, WorkerFailure};
use crate::formatters::SharedFormatter;
use crate::lifecycle::Lifecycle;
use crate::metrics::DispatchMetrics;
use crate::queue::{Dequeued, QueueConsumer};
use crate::transport::TransportRecord;

/// State owned by the background thread
pub(crate) struct Worker {
    pub(crate) consumer: QueueConsumer<TransportRecord>,
    pub(crate) formatter: Arc<SharedFormatter>,
    pub(crate) sinks: Vec<Box<dyn Sink>>,
    pub(crate) lifecycle: Arc<Lifecycle>,
    pub(crate) failure: Arc<FailureSlot>,
    pub(crate) metrics: Arc<DispatchMetrics>,
}

impl Worker {
    /// Drain until shutdown has been observed and the queue is empty
    ///
    /// The first time the lifecycle reads as not Running the queue is closed.
    /// From then on every enqueue fails with `Closed`, so each record a
    /// producer managed to enqueue is still dequeued here before the loop
    /// ends on `Dequeued::Closed`.
    pub(crate) fn run(mut self) {
        debug!(sinks = self.sinks.len(), "Dispatcher worker started");

        let mut closed = false;
        let mut last_pop = Instant::now();
        loop {
            if !closed && !self.lifecycle.is_running() {
                self.consumer.close();
                closed = true;
                debug!("Queue closed, draining remaining records");
            }
            match self.consumer.try_dequeue() {
                Dequeued::Item(record) => {
                    last_pop = Instant::now();
                    self.process(record);
                }
                // A send that won a permit before the close is still landing
                Dequeued::Empty if closed => thread::yield_now(),
                Dequeued::Empty => {
                    backoff::wait(last_pop.elapsed());
                }
                Dequeued::Closed => break,
            }
        }

        self.flush_sinks();

        debug!(
            processed = self.metrics.processed(),
            failed = self.metrics.failed(),
            "Dispatcher worker stopped"
        );
    }

    /// Handle one record; failures are captured, never propagated
    ///
    /// A failure is published before the record counts as processed, so a
    /// reader that sees the processed count also sees the failure.
    fn process(&mut self, record: TransportRecord) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(record)))
            .unwrap_or_else(|payload| Err(WorkerFailure::panic(payload.as_ref())));

        if let Err(failure) = outcome {
            warn!(kind = %failure.kind, error = %failure.message, "Record processing failed");
            self.metrics.inc_failed();
            if self.failure.publish(failure) {
                debug!("Unobserved worker failure overwritten");
            }
        }

        self.metrics.inc_processed();
    }

    /// Rebuild, format and fan out to every sink in registration order
    ///
    /// The first failing sink ends processing of this record.
    fn dispatch(&mut self, record: TransportRecord) -> Result<(), WorkerFailure> {
        let mut record = record.into_log_record();

        let formatter = self.formatter.current();
        formatter
            .format(&mut record)
            .map_err(WorkerFailure::format)?;

        for sink in self.sinks.iter_mut() {
            sink.log(&record)
                .map_err(|e| WorkerFailure::sink(sink.name(), e))?;
        }
        Ok(())
    }

    fn flush_sinks(&mut self) {
        for sink in self.sinks.iter_mut() {
            let name = sink.name().to_string();
            match panic::catch_unwind(AssertUnwindSafe(|| sink.flush())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(sink = %name, error = %e, "Flush failed on shutdown"),
                Err(_) => error!(sink = %name, "Sink panicked during flush"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::PlainFormatter;
    use crate::queue::handoff;
    use crate::sinks::MemorySink;
    use contracts::{ContractError, Level, LogRecord};

    struct FailingSink;

    impl Sink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        fn log(&mut self, _record: &LogRecord) -> Result<(), ContractError> {
            Err(ContractError::sink_write("failing", "mock failure"))
        }

        fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    fn worker_with(sinks: Vec<Box<dyn Sink>>) -> (crate::queue::QueueProducer<TransportRecord>, Worker) {
        let (producer, consumer) = handoff(8);
        let worker = Worker {
            consumer,
            formatter: Arc::new(SharedFormatter::new(Arc::new(PlainFormatter::new()))),
            sinks,
            lifecycle: Arc::new(Lifecycle::new()),
            failure: Arc::new(FailureSlot::default()),
            metrics: Arc::new(DispatchMetrics::new()),
        };
        (producer, worker)
    }

    fn transport(raw: &str) -> TransportRecord {
        TransportRecord::from(&LogRecord::new("test", Level::Info, raw))
    }

    #[test]
    fn test_drains_queue_after_stop() {
        let memory = MemorySink::new("mem");
        let (producer, worker) = worker_with(vec![Box::new(memory.clone())]);
        for i in 0..5 {
            producer.try_enqueue(transport(&format!("msg {i}"))).unwrap();
        }
        worker.lifecycle.begin_stopping();

        let metrics = Arc::clone(&worker.metrics);
        thread::spawn(move || worker.run()).join().unwrap();

        assert_eq!(memory.len(), 5);
        assert_eq!(memory.flush_count(), 1);
        assert_eq!(metrics.processed(), 5);
    }

    #[test]
    fn test_failing_sink_stops_record_not_loop() {
        let after = MemorySink::new("after");
        let (producer, worker) =
            worker_with(vec![Box::new(FailingSink), Box::new(after.clone())]);
        producer.try_enqueue(transport("a")).unwrap();
        producer.try_enqueue(transport("b")).unwrap();
        worker.lifecycle.begin_stopping();

        let failure = Arc::clone(&worker.failure);
        let metrics = Arc::clone(&worker.metrics);
        worker.run();

        assert!(after.is_empty());
        assert_eq!(metrics.processed(), 2);
        assert_eq!(metrics.failed(), 2);
        assert!(failure.take().is_some());
        assert!(failure.take().is_none());
    }

    #[test]
    fn test_enqueue_rejected_once_stopping_observed() {
        let memory = MemorySink::new("mem");
        let (producer, worker) = worker_with(vec![Box::new(memory.clone())]);
        producer.try_enqueue(transport("queued")).unwrap();
        worker.lifecycle.begin_stopping();
        worker.run();

        assert!(matches!(
            producer.try_enqueue(transport("late")),
            Err(crate::queue::EnqueueError::Closed(_))
        ));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_failure_visible_once_processed() {
        let (producer, worker) = worker_with(vec![Box::new(FailingSink)]);
        producer.try_enqueue(transport("a")).unwrap();
        drop(producer);

        let failure = Arc::clone(&worker.failure);
        let metrics = Arc::clone(&worker.metrics);
        let handle = thread::spawn(move || worker.run());

        while metrics.processed() < 1 {
            thread::yield_now();
        }
        assert_eq!(metrics.failed(), 1);
        assert!(failure.take().is_some());
        handle.join().unwrap();
    }

    #[test]
    fn test_exits_when_producers_gone() {
        let (producer, worker) = worker_with(Vec::new());
        drop(producer);
        // Still Running, but the queue reports Closed
        worker.run();
    }
}

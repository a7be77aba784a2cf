//! Dispatcher metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::DispatchSnapshot;

/// Counters shared between producers and the worker
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Records accepted into the queue
    submitted: AtomicU64,
    /// Records the worker finished
    processed: AtomicU64,
    /// Records whose formatting or sinking failed
    failed: AtomicU64,
    /// Submits that had to wait for space
    backpressure_events: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get submitted count
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Increment submitted count
    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processed count
    ///
    /// Acquire pairs with the worker's Release increment: everything the
    /// worker did for a record is visible once it is counted here.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }

    /// Increment processed count
    pub fn inc_processed(&self) {
        self.processed.fetch_add(1, Ordering::Release);
    }

    /// Get failure count
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get backpressure event count
    pub fn backpressure_events(&self) -> u64 {
        self.backpressure_events.load(Ordering::Relaxed)
    }

    /// Increment backpressure event count
    pub fn inc_backpressure_events(&self) {
        self.backpressure_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self, queue_len: usize, queue_capacity: usize) -> DispatchSnapshot {
        DispatchSnapshot {
            queue_len,
            queue_capacity,
            submitted: self.submitted(),
            processed: self.processed(),
            failed: self.failed(),
            backpressure_events: self.backpressure_events(),
        }
    }
}

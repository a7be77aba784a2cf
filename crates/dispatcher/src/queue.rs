//! Bounded hand-off queue between producers and the worker
//!
//! Thin non-blocking facade over a bounded `tokio::sync::mpsc` channel. Only
//! `try_enqueue` / `try_dequeue` are exposed; neither needs a runtime and
//! neither ever parks the calling thread.

use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

/// Create a queue with a fixed `capacity`
///
/// `capacity` must be non-zero; the dispatcher validates it first.
pub(crate) fn handoff<T>(capacity: usize) -> (QueueProducer<T>, QueueConsumer<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (QueueProducer { tx }, QueueConsumer { rx })
}

/// Rejected enqueue; the item is handed back untouched
#[derive(Debug)]
pub(crate) enum EnqueueError<T> {
    /// Queue at capacity
    Full(T),
    /// Consumer side is gone
    Closed(T),
}

/// Outcome of a dequeue attempt
#[derive(Debug)]
pub(crate) enum Dequeued<T> {
    Item(T),
    Empty,
    /// Closed (or every producer is gone) and the queue is drained
    Closed,
}

/// Producer half, shared by all submitting threads
#[derive(Debug)]
pub(crate) struct QueueProducer<T> {
    tx: mpsc::Sender<T>,
}

impl<T> QueueProducer<T> {
    pub(crate) fn try_enqueue(&self, item: T) -> Result<(), EnqueueError<T>> {
        self.tx.try_send(item).map_err(|e| match e {
            TrySendError::Full(item) => EnqueueError::Full(item),
            TrySendError::Closed(item) => EnqueueError::Closed(item),
        })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Approximate number of queued items
    pub(crate) fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}

/// Consumer half, owned by the worker
#[derive(Debug)]
pub(crate) struct QueueConsumer<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> QueueConsumer<T> {
    pub(crate) fn try_dequeue(&mut self) -> Dequeued<T> {
        match self.rx.try_recv() {
            Ok(item) => Dequeued::Item(item),
            Err(TryRecvError::Empty) => Dequeued::Empty,
            Err(TryRecvError::Disconnected) => Dequeued::Closed,
        }
    }

    /// Refuse further enqueues; items already queued can still be dequeued
    pub(crate) fn close(&mut self) {
        self.rx.close();
    }
}

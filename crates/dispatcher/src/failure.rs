//! Captured worker failure and the slot that carries it to producers

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use contracts::ContractError;
use parking_lot::Mutex;
use thiserror::Error;

/// Where in the pipeline the worker failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The formatter returned an error
    Format,
    /// A sink returned an error
    Sink { name: String },
    /// The formatter or a sink panicked
    Panic,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Format => f.write_str("format"),
            FailureKind::Sink { name } => write!(f, "sink '{name}'"),
            FailureKind::Panic => f.write_str("panic"),
        }
    }
}

/// An unhandled error raised while the worker processed one record
#[derive(Debug, PartialEq, Eq, Error)]
#[error("async logger worker failure ({kind}): {message}")]
pub struct WorkerFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl WorkerFailure {
    pub fn format(err: ContractError) -> Self {
        Self {
            kind: FailureKind::Format,
            message: err.to_string(),
        }
    }

    pub fn sink(name: impl Into<String>, err: ContractError) -> Self {
        Self {
            kind: FailureKind::Sink { name: name.into() },
            message: err.to_string(),
        }
    }

    pub fn panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self {
            kind: FailureKind::Panic,
            message,
        }
    }
}

/// Single-entry, latest-wins hand-off from the worker to producers
///
/// The flag lets `take` skip the lock on the hot path. Both are updated
/// under the lock; the flag store is `Release` and the fast-path load is
/// `Acquire`, so a producer that sees the flag also sees the failure.
#[derive(Debug, Default)]
pub(crate) struct FailureSlot {
    pending: AtomicBool,
    slot: Mutex<Option<WorkerFailure>>,
}

impl FailureSlot {
    /// Store `failure`, returning true if it replaced an unobserved one
    pub(crate) fn publish(&self, failure: WorkerFailure) -> bool {
        let mut slot = self.slot.lock();
        let replaced = slot.replace(failure).is_some();
        self.pending.store(true, Ordering::Release);
        replaced
    }

    /// Read and clear the pending failure, if any
    pub(crate) fn take(&self) -> Option<WorkerFailure> {
        if !self.pending.load(Ordering::Acquire) {
            return None;
        }
        let mut slot = self.slot.lock();
        self.pending.store(false, Ordering::Release);
        slot.take()
    }
}

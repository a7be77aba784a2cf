//! DispatchSnapshot - point-in-time dispatcher counters

use serde::Serialize;

/// Snapshot of dispatcher metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSnapshot {
    /// Approximate number of records waiting in the queue
    pub queue_len: usize,
    /// Fixed queue capacity
    pub queue_capacity: usize,
    /// Records accepted by `submit`
    pub submitted: u64,
    /// Records the worker finished (successfully or not)
    pub processed: u64,
    /// Records whose formatting or sinking failed
    pub failed: u64,
    /// Submits that found the queue full and had to wait
    pub backpressure_events: u64,
}

impl DispatchSnapshot {
    /// Records accepted but not yet processed
    pub fn in_flight(&self) -> u64 {
        self.submitted.saturating_sub(self.processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight() {
        let snap = DispatchSnapshot {
            submitted: 10,
            processed: 7,
            ..Default::default()
        };
        assert_eq!(snap.in_flight(), 3);
    }
}

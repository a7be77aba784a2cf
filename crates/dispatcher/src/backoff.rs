//! Adaptive backoff shared by the submit retry loop and the idle worker
//!
//! The time since the last successful queue operation picks the wait:
//!
//! | elapsed          | action                |
//! |------------------|-----------------------|
//! | ≤ 1 ms           | spin (return at once) |
//! | ≤ 10 ms          | yield the thread      |
//! | ≤ 100 ms         | sleep `elapsed / 2`   |
//! | > 100 ms         | sleep 100 ms          |

use std::thread;
use std::time::Duration;

/// Upper bound of the spin phase
pub const SPIN_LIMIT: Duration = Duration::from_millis(1);

/// Upper bound of the yield phase
pub const YIELD_LIMIT: Duration = Duration::from_millis(10);

/// Upper bound of the proportional sleep phase
pub const PROPORTIONAL_LIMIT: Duration = Duration::from_millis(100);

/// Longest single sleep
pub const MAX_SLEEP: Duration = Duration::from_millis(100);

/// What the caller does before re-checking its condition
///
/// Variants are ordered from least to most patient, so `Ord` can be used
/// to compare two decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WaitAction {
    /// Re-check immediately
    Spin,
    /// Give up the rest of the scheduling quantum
    Yield,
    /// Park the thread for the given duration
    Sleep(Duration),
}

impl WaitAction {
    /// Carry out the wait on the current thread
    pub fn perform(self) {
        match self {
            WaitAction::Spin => std::hint::spin_loop(),
            WaitAction::Yield => thread::yield_now(),
            WaitAction::Sleep(duration) => thread::sleep(duration),
        }
    }
}

/// Pick the wait for `elapsed` time since the last successful operation
pub fn action_for(elapsed: Duration) -> WaitAction {
    if elapsed <= SPIN_LIMIT {
        WaitAction::Spin
    } else if elapsed <= YIELD_LIMIT {
        WaitAction::Yield
    } else if elapsed <= PROPORTIONAL_LIMIT {
        WaitAction::Sleep(elapsed / 2)
    } else {
        WaitAction::Sleep(MAX_SLEEP)
    }
}

/// Decide and perform the wait, returning what was done
pub fn wait(elapsed: Duration) -> WaitAction {
    let action = action_for(elapsed);
    action.perform();
    action
}

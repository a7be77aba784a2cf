//! Load generation over the async dispatcher.

mod generator;
mod stats;

pub use generator::{LoadConfig, LoadGenerator};
pub use stats::RunStats;

//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only, reverse dependencies are prohibited.
//!
//! ## Collaborators
//! - [`LogRecord`] is the caller-owned structured record
//! - [`Formatter`] renders a record in place
//! - [`Sink`] performs the actual output I/O
//!
//! The dispatcher consumes these through the traits alone and never looks
//! inside a concrete formatter or sink.

mod blueprint;
mod error;
mod formatter;
mod record;
mod sink;
mod stats;

pub use blueprint::*;
pub use error::*;
pub use formatter::Formatter;
pub use record::{Level, LogRecord};
pub use sink::Sink;
pub use stats::DispatchSnapshot;

//! Core domain types
//!
//! These types describe what the monitor observes about a remote training
//! job. They are produced by the client crate and consumed by the monitor
//! loop and its reporting sinks.

pub mod snapshot;
pub mod status;

pub use snapshot::{Snapshot, Timeline, TimelinePhase};
pub use status::JobStatus;

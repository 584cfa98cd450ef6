//! Repository layer
//!
//! Abstracts where snapshots come from so the monitor loop can be driven by
//! the HTTP client in production and by scripted sources in tests.

pub mod status;

pub use status::StatusRepository;

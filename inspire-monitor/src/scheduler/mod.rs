//! Scheduler layer of the monitor
//!
//! This layer drives a monitoring session: it polls the status repository
//! at a fixed cadence, keeps the snapshot history, decides what to report
//! and stops on completion, timeout or cancellation.

pub mod history;
pub mod monitor;
pub mod shutdown;

pub use history::History;
pub use monitor::MonitorLoop;
pub use shutdown::{ShutdownToken, cancel_on_signal, shutdown_channel};

//! Sliding-window throughput alerting.
//!
//! A [`monitor::ThroughputMonitor`] keeps the timestamps of recent requests
//! in a time-ordered window and, on each evaluation, compares the trailing
//! request rate against a configured threshold. Threshold crossings are
//! latched: exactly one critical alert fires when traffic goes high and
//! exactly one recovery fires when it drops back, no matter how many
//! evaluations land in between.

pub mod error;
pub mod monitor;
pub mod window;


pub use error::{MonitorError, Result};
pub use monitor::ThroughputMonitor;

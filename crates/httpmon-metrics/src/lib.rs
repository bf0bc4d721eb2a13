//! Traffic metrics accumulation and orchestration.
//!
//! [`accumulator::Metrics`] is a resettable accumulator of per-host hit and
//! section counts, a status-class histogram and request totals.
//! [`manager::MetricManager`] feeds parsed records into two such
//! accumulators (a periodically flushed interval one and a never-reset
//! lifetime one), forwards request timestamps to the registered throughput
//! monitors, and owns the append-only alert history.

pub mod accumulator;
pub mod manager;
pub mod snapshot;


pub use accumulator::{Metrics, Website};
pub use manager::MetricManager;
pub use snapshot::{MaxSiteSnapshot, MetricsSnapshot};

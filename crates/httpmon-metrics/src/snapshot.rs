use serde::Serialize;
use std::collections::BTreeMap;

/// An immutable snapshot of one accumulator, taken for display or export.
///
/// Snapshots carry computed figures (rates, elapsed time) alongside the raw
/// counters so the renderer never needs to touch the live accumulator.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    /// Fraction of requests with a `2xx` status, in `[0, 1]`.
    pub success_rate: f64,
    pub requests_per_second: f64,
    /// Seconds since the accumulator was created or last reset.
    pub elapsed_secs: f64,
    /// The busiest website, or `None` before any website hit was recorded.
    pub max_site: Option<MaxSiteSnapshot>,
    /// Request count per status class digit, in digit order.
    pub status_counts: BTreeMap<char, u64>,
}

/// The busiest website at snapshot time.
#[derive(Debug, Clone, Serialize)]
pub struct MaxSiteSnapshot {
    pub host: String,
    pub hits: u64,
    /// Sections recorded for this host, sorted.
    pub sections: Vec<String>,
}

impl MetricsSnapshot {
    /// Success rate as a percentage string, e.g. `"98.41%"`.
    pub fn success_percent(&self) -> String {
        format!("{:.2}%", self.success_rate * 100.0)
    }
}

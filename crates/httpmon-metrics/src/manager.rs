use crate::accumulator::Metrics;
use crate::snapshot::MetricsSnapshot;
use chrono::{DateTime, Utc};
use httpmon_alert::{MonitorError, ThroughputMonitor};
use httpmon_common::types::{AlertEvent, AlertKind, LogRecord, MonitorConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Orchestrates the accumulators, the throughput monitors and the alert
/// history.
///
/// Shared state is guarded coarsely, one lock per accumulator, per monitor
/// and for the history; no operation holds a lock across blocking I/O.
/// `flush_interval` therefore never observes a half-applied `analyze`
/// update.
pub struct MetricManager {
    interval: Mutex<Metrics>,
    lifetime: Mutex<Metrics>,
    monitors: Vec<Mutex<ThroughputMonitor>>,
    alerts: Mutex<Vec<AlertEvent>>,
    invalid_lines: AtomicU64,
}

impl MetricManager {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            interval: Mutex::new(Metrics::new(now)),
            lifetime: Mutex::new(Metrics::new(now)),
            monitors: Vec::new(),
            alerts: Mutex::new(Vec::new()),
            invalid_lines: AtomicU64::new(0),
        }
    }

    /// Registers a throughput monitor. Monitors are added during setup,
    /// before the manager is shared across tasks.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidConfig`] for an out-of-range
    /// configuration.
    pub fn add_monitor(&mut self, config: MonitorConfig) -> Result<(), MonitorError> {
        let monitor = ThroughputMonitor::new(config)?;
        self.monitors.push(Mutex::new(monitor));
        Ok(())
    }

    pub fn monitor_count(&self) -> usize {
        self.monitors.len()
    }

    /// The configuration of every registered monitor, in registration order.
    pub fn monitor_configs(&self) -> Vec<MonitorConfig> {
        self.monitors
            .iter()
            .map(|m| *m.lock().unwrap().config())
            .collect()
    }

    /// Feeds one parsed record into both accumulators and forwards its
    /// arrival timestamp to every monitor.
    ///
    /// A record with an empty host or URL still counts toward the totals
    /// and the status histogram; only the per-website update is skipped.
    pub fn analyze(&self, record: &LogRecord, now: DateTime<Utc>) {
        let section = website_section(record);

        apply(&mut self.interval.lock().unwrap(), record, section.as_deref());
        apply(&mut self.lifetime.lock().unwrap(), record, section.as_deref());

        for monitor in &self.monitors {
            if let Err(e) = monitor.lock().unwrap().add_request(now) {
                // An out-of-order arrival timestamp is an upstream bug;
                // the record itself has already been counted.
                tracing::warn!(error = %e, "Dropping request timestamp from monitor window");
            }
        }
    }

    /// Counts a line that failed to parse. Invalid lines never count as
    /// requests.
    pub fn record_invalid_line(&self) {
        self.invalid_lines.fetch_add(1, Ordering::Relaxed);
    }

    /// Lines that failed to parse since the manager was created.
    pub fn invalid_lines(&self) -> u64 {
        self.invalid_lines.load(Ordering::Relaxed)
    }

    /// Re-evaluates one monitor's window at `now`. An emitted alert is
    /// appended to the shared history immediately and logged.
    ///
    /// # Errors
    ///
    /// Propagates [`MonitorError`] for invalid evaluation input.
    pub fn evaluate_monitor(
        &self,
        index: usize,
        now: DateTime<Utc>,
    ) -> Result<Option<AlertEvent>, MonitorError> {
        let Some(slot) = self.monitors.get(index) else {
            return Ok(None);
        };

        let event = slot.lock().unwrap().evaluate(now)?;
        if let Some(event) = &event {
            self.alerts.lock().unwrap().push(event.clone());
            match event.kind {
                AlertKind::Critical => tracing::warn!(monitor = index, "{event}"),
                AlertKind::Recovery => tracing::info!(monitor = index, "{event}"),
            }
        }
        Ok(event)
    }

    /// Resets the interval accumulator. The lifetime accumulator and the
    /// alert history are untouched.
    pub fn flush_interval(&self, now: DateTime<Utc>) {
        self.interval.lock().unwrap().reset(now);
    }

    /// Snapshot of the metrics recorded since the last flush.
    pub fn current_snapshot(&self, now: DateTime<Utc>) -> MetricsSnapshot {
        self.interval.lock().unwrap().snapshot(now)
    }

    /// Snapshot of the metrics recorded since the manager was created.
    pub fn lifetime_snapshot(&self, now: DateTime<Utc>) -> MetricsSnapshot {
        self.lifetime.lock().unwrap().snapshot(now)
    }

    /// Every alert emitted so far, oldest first.
    pub fn alert_history(&self) -> Vec<AlertEvent> {
        self.alerts.lock().unwrap().clone()
    }
}

/// Applies one record to one accumulator while its lock is held.
fn apply(metrics: &mut Metrics, record: &LogRecord, section: Option<&str>) {
    if let Some(section) = section {
        metrics.record_website_hit(&record.host, section);
    }
    if let Some(class) = record.status_class() {
        metrics.record_status(class);
    }
    metrics.increment_total_requests();
}

/// Derives the section bucket for a record: the host concatenated with the
/// first path segment of the request URL. A record missing either field
/// yields no section; a URL with no path segment buckets under the host
/// alone.
fn website_section(record: &LogRecord) -> Option<String> {
    if record.host.is_empty() || record.request_url.is_empty() {
        return None;
    }

    let first_segment = record
        .request_url
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or("");

    if first_segment.is_empty() {
        Some(record.host.clone())
    } else {
        Some(format!("{}/{}", record.host, first_segment))
    }
}

#[cfg(test)]
mod section_tests {
    use super::website_section;
    use httpmon_common::types::LogRecord;

    fn make_record(host: &str, url: &str) -> LogRecord {
        LogRecord {
            host: host.to_string(),
            client_id: "-".to_string(),
            auth_user: "-".to_string(),
            date: "09/May/2018:16:00:39 +0000".to_string(),
            request_method: "GET".to_string(),
            request_url: url.to_string(),
            request_protocol: "HTTP/1.0".to_string(),
            status: "200".to_string(),
            bytes: "0".to_string(),
        }
    }

    #[test]
    fn section_is_host_plus_first_path_segment() {
        assert_eq!(
            website_section(&make_record("10.0.0.1", "/api/user")),
            Some("10.0.0.1/api".to_string())
        );
        assert_eq!(
            website_section(&make_record("10.0.0.1", "/report")),
            Some("10.0.0.1/report".to_string())
        );
    }

    #[test]
    fn root_url_buckets_under_the_host_alone() {
        assert_eq!(
            website_section(&make_record("10.0.0.1", "/")),
            Some("10.0.0.1".to_string())
        );
    }

    #[test]
    fn missing_host_or_url_yields_no_section() {
        assert_eq!(website_section(&make_record("", "/api/user")), None);
        assert_eq!(website_section(&make_record("10.0.0.1", "")), None);
    }
}

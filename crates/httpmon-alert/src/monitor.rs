use crate::error::{MonitorError, Result};
use crate::window::RequestWindow;
use chrono::{DateTime, Utc};
use httpmon_common::types::{AlertEvent, AlertKind, MonitorConfig};

/// Tracks requests-per-second over a trailing time window and emits latched
/// alert/recovery transitions when the rate crosses the configured threshold.
///
/// The monitor has two states, normal and high-traffic. A crossing into
/// high traffic emits one critical [`AlertEvent`]; a crossing back emits one
/// recovery. Staying at or above the threshold while already in high
/// traffic never re-fires.
#[derive(Debug)]
pub struct ThroughputMonitor {
    config: MonitorConfig,
    window: RequestWindow,
    high_traffic: bool,
}

impl ThroughputMonitor {
    /// Creates a monitor for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidConfig`] if the threshold is not a
    /// finite positive number, or if the window or poll interval is zero.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        if !config.rps_threshold.is_finite() || config.rps_threshold <= 0.0 {
            return Err(MonitorError::InvalidConfig(format!(
                "rps_threshold must be a finite positive number, got {}",
                config.rps_threshold
            )));
        }
        if config.window_millis == 0 {
            return Err(MonitorError::InvalidConfig(
                "window_millis must be positive".to_string(),
            ));
        }
        if config.poll_interval_millis == 0 {
            return Err(MonitorError::InvalidConfig(
                "poll_interval_millis must be positive".to_string(),
            ));
        }

        Ok(Self {
            window: RequestWindow::new(config.window_millis),
            config,
            high_traffic: false,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// True while the monitor is latched in the high-traffic state.
    pub fn is_high_traffic(&self) -> bool {
        self.high_traffic
    }

    /// Appends one request timestamp to the window.
    ///
    /// Eviction is lazy; it happens on the next [`evaluate`](Self::evaluate).
    ///
    /// # Errors
    ///
    /// Rejects timestamps that predate the Unix epoch or regress behind the
    /// newest queued timestamp. The window is never sorted.
    pub fn add_request(&mut self, timestamp: DateTime<Utc>) -> Result<()> {
        if timestamp.timestamp_millis() < 0 {
            return Err(MonitorError::PreEpochTimestamp(timestamp));
        }
        if let Some(newest) = self.window.newest() {
            if timestamp < newest {
                return Err(MonitorError::TimestampRegression { timestamp, newest });
            }
        }
        self.window.push(timestamp);
        Ok(())
    }

    /// The request rate currently in the window, in requests per second.
    ///
    /// The window size is the denominator regardless of how full it is, so
    /// the rate only reflects reality once eviction has run for `now`.
    pub fn current_rps(&self) -> f64 {
        self.window.len() as f64 / (self.config.window_millis as f64 / 1000.0)
    }

    /// Re-evaluates the window at `now`: evicts expired timestamps, then
    /// checks the trailing rate against the threshold.
    ///
    /// Returns the alert for a state transition, or `None` when the state
    /// is unchanged.
    ///
    /// # Errors
    ///
    /// Rejects an evaluation time that predates the Unix epoch.
    pub fn evaluate(&mut self, now: DateTime<Utc>) -> Result<Option<AlertEvent>> {
        if now.timestamp_millis() < 0 {
            return Err(MonitorError::PreEpochTimestamp(now));
        }

        self.window.evict(now);
        let rps = self.current_rps();

        if !self.high_traffic && rps >= self.config.rps_threshold {
            self.high_traffic = true;
            return Ok(Some(AlertEvent::new(
                self.window.len(),
                AlertKind::Critical,
                now,
            )));
        }
        if self.high_traffic && rps < self.config.rps_threshold {
            self.high_traffic = false;
            return Ok(Some(AlertEvent::new(
                self.window.len(),
                AlertKind::Recovery,
                now,
            )));
        }

        Ok(None)
    }

    /// Number of request timestamps currently in the window.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// The oldest timestamp still in the window, if any.
    pub fn oldest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.window.oldest()
    }
}

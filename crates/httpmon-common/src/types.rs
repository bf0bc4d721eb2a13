use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One access log entry, parsed from a line in the fixed
/// `HOST IDENT AUTHUSER [DATE] "METHOD URL PROTOCOL" STATUS BYTES` grammar.
///
/// Records are immutable once produced by the parser. `date`, `status` and
/// `bytes` are kept as the raw captured strings; only the first character of
/// `status` (the status class) is interpreted downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub host: String,
    pub client_id: String,
    pub auth_user: String,
    /// The bracketed date, captured verbatim (e.g. `09/May/2018:16:00:39 +0000`).
    pub date: String,
    pub request_method: String,
    pub request_url: String,
    pub request_protocol: String,
    pub status: String,
    pub bytes: String,
}

impl LogRecord {
    /// The hundreds digit of the status code (e.g. `'2'` for `200`),
    /// or `None` if the status field is empty.
    pub fn status_class(&self) -> Option<char> {
        self.status.chars().next()
    }
}

/// Whether an alert marks the onset of high traffic or the recovery from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Critical,
    Recovery,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::Critical => write!(f, "critical"),
            AlertKind::Recovery => write!(f, "recovery"),
        }
    }
}

/// A latched threshold transition emitted by a throughput monitor.
///
/// Events are appended once to an ordered history and never removed.
///
/// Equality deliberately compares only `kind` and `hits`; call sites that
/// need exact-timestamp reproducibility use [`AlertEvent::matches_exactly`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Number of requests in the window at the moment of transition.
    pub hits: usize,
    pub kind: AlertKind,
    /// When the transition was detected.
    pub timestamp: DateTime<Utc>,
}

impl AlertEvent {
    pub fn new(hits: usize, kind: AlertKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            hits,
            kind,
            timestamp,
        }
    }

    pub fn is_recovery(&self) -> bool {
        self.kind == AlertKind::Recovery
    }

    /// Human-readable form of the detection timestamp.
    pub fn formatted_date(&self) -> String {
        self.timestamp.format("%d/%m/%Y %H:%M:%S").to_string()
    }

    /// Strict equality including the detection timestamp.
    pub fn matches_exactly(&self, other: &AlertEvent) -> bool {
        self == other && self.timestamp == other.timestamp
    }
}

impl PartialEq for AlertEvent {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.hits == other.hits
    }
}

impl std::fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            AlertKind::Critical => write!(
                f,
                "[CRITICAL] High traffic generated an alert - hits = {} triggered at {}",
                self.hits,
                self.formatted_date()
            ),
            AlertKind::Recovery => write!(
                f,
                "[RECOVERY] High traffic has recovered - hits = {} triggered at {}",
                self.hits,
                self.formatted_date()
            ),
        }
    }
}

/// Configuration for one throughput monitor watching the request stream.
///
/// Several monitors may watch the same stream with different thresholds
/// and windows. Validation happens when the monitor is constructed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Alert when the trailing-window request rate reaches this value.
    pub rps_threshold: f64,
    /// Length of the trailing window, in milliseconds.
    pub window_millis: u64,
    /// How often the window is re-evaluated, in milliseconds.
    pub poll_interval_millis: u64,
}

use chrono::{DateTime, Utc};

/// Errors that can occur when configuring or feeding a throughput monitor.
///
/// Invalid configuration is rejected at construction; invalid runtime input
/// is rejected at the call boundary rather than silently normalized, so
/// bugs upstream surface fast.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MonitorError {
    /// A configuration value is out of range (non-positive or non-finite).
    #[error("Monitor: invalid configuration: {0}")]
    InvalidConfig(String),

    /// A request timestamp predates the Unix epoch.
    #[error("Monitor: request timestamp {0} predates the Unix epoch")]
    PreEpochTimestamp(DateTime<Utc>),

    /// Request timestamps must be appended in non-decreasing order; the
    /// window is never sorted.
    #[error("Monitor: request timestamp {timestamp} precedes the newest queued timestamp {newest}")]
    TimestampRegression {
        timestamp: DateTime<Utc>,
        newest: DateTime<Utc>,
    },
}

/// Convenience `Result` alias for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

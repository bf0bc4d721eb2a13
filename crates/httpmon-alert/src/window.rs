use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// A FIFO window of request timestamps, oldest first.
///
/// Timestamps are appended in non-decreasing order (the caller's contract,
/// enforced by the monitor), so eviction only ever pops from the front and
/// is amortized O(1) per call.
#[derive(Debug)]
pub struct RequestWindow {
    window_millis: i64,
    data: VecDeque<DateTime<Utc>>,
}

impl RequestWindow {
    pub fn new(window_millis: u64) -> Self {
        Self {
            window_millis: window_millis as i64,
            data: VecDeque::new(),
        }
    }

    pub fn push(&mut self, timestamp: DateTime<Utc>) {
        self.data.push_back(timestamp);
    }

    /// Drops every timestamp older than `now - window`. Timestamps exactly
    /// at the window edge are kept.
    pub fn evict(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::milliseconds(self.window_millis);
        while let Some(front) = self.data.front() {
            if *front < cutoff {
                self.data.pop_front();
            } else {
                break;
            }
        }
    }

    /// The most recently appended timestamp, if any.
    pub fn newest(&self) -> Option<DateTime<Utc>> {
        self.data.back().copied()
    }

    /// The oldest timestamp still in the window, if any.
    pub fn oldest(&self) -> Option<DateTime<Utc>> {
        self.data.front().copied()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

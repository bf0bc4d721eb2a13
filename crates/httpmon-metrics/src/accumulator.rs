use crate::snapshot::{MaxSiteSnapshot, MetricsSnapshot};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Per-host bookkeeping: a monotonically increasing hit counter and the set
/// of distinct sections requested on that host.
///
/// A `Website` is owned exclusively by the accumulator that created it and
/// is never shared across accumulators or reused across resets.
#[derive(Debug)]
pub struct Website {
    name: String,
    hits: u64,
    sections: HashSet<String>,
}

impl Website {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            hits: 0,
            sections: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn sections(&self) -> &HashSet<String> {
        &self.sections
    }
}

/// A resettable accumulator of traffic metrics.
///
/// One interval instance and one lifetime instance are structurally
/// identical; only their reset cadence differs. Invariant: `max_site` names
/// the website whose hit count equals `max_site_hits`, the maximum across
/// all websites seen since the last reset. Ties keep the first website that
/// reached the maximum.
#[derive(Debug)]
pub struct Metrics {
    websites: HashMap<String, Website>,
    max_site: Option<String>,
    max_site_hits: u64,
    status_counts: HashMap<char, u64>,
    total_requests: u64,
    start_time: DateTime<Utc>,
}

impl Metrics {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            websites: HashMap::new(),
            max_site: None,
            max_site_hits: 0,
            status_counts: HashMap::new(),
            total_requests: 0,
            start_time: now,
        }
    }

    /// Looks up or creates the website for `host`, records the section and
    /// the hit, and updates the running maximum on a strict increase.
    pub fn record_website_hit(&mut self, host: &str, section: &str) {
        let website = self
            .websites
            .entry(host.to_string())
            .or_insert_with(|| Website::new(host));
        website.sections.insert(section.to_string());
        website.hits += 1;

        // Strict `>`: a later site matching the maximum does not displace
        // the first one that reached it.
        if website.hits > self.max_site_hits {
            self.max_site_hits = website.hits;
            self.max_site = Some(host.to_string());
        }
    }

    /// Increments the histogram bucket for one status class digit.
    pub fn record_status(&mut self, status_class: char) {
        *self.status_counts.entry(status_class).or_insert(0) += 1;
    }

    pub fn increment_total_requests(&mut self) {
        self.total_requests += 1;
    }

    /// Clears every counter and restarts the clock. Website entries are
    /// dropped, not reused.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.websites.clear();
        self.max_site = None;
        self.max_site_hits = 0;
        self.status_counts.clear();
        self.total_requests = 0;
        self.start_time = now;
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// The website currently holding the maximum hit count, if any.
    pub fn max_site(&self) -> Option<&Website> {
        self.max_site.as_deref().and_then(|h| self.websites.get(h))
    }

    pub fn max_site_hits(&self) -> u64 {
        self.max_site_hits
    }

    pub fn status_count(&self, status_class: char) -> u64 {
        self.status_counts.get(&status_class).copied().unwrap_or(0)
    }

    /// Fraction of requests with a `2xx` status, always in `[0, 1]`.
    /// Zero when no request has been recorded.
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.status_count('2') as f64 / self.total_requests as f64
    }

    /// Average requests per second since the last reset. Zero when no time
    /// has elapsed yet.
    pub fn requests_per_second(&self, now: DateTime<Utc>) -> f64 {
        let elapsed_secs = (now - self.start_time).num_milliseconds() as f64 / 1000.0;
        if elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.total_requests as f64 / elapsed_secs
    }

    /// The sections recorded for the busiest website, sorted for stable
    /// output. `["None"]` when no maximum exists yet.
    pub fn max_site_sections(&self) -> Vec<String> {
        match self.max_site() {
            Some(website) => {
                let mut sections: Vec<String> = website.sections.iter().cloned().collect();
                sections.sort();
                sections
            }
            None => vec!["None".to_string()],
        }
    }

    /// An immutable copy of the current counters for the renderer.
    pub fn snapshot(&self, now: DateTime<Utc>) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests,
            success_rate: self.success_rate(),
            requests_per_second: self.requests_per_second(now),
            elapsed_secs: (now - self.start_time).num_milliseconds() as f64 / 1000.0,
            max_site: self.max_site().map(|website| MaxSiteSnapshot {
                host: website.name.clone(),
                hits: website.hits,
                sections: self.max_site_sections(),
            }),
            status_counts: self
                .status_counts
                .iter()
                .map(|(class, count)| (*class, *count))
                .collect::<BTreeMap<char, u64>>(),
        }
    }
}

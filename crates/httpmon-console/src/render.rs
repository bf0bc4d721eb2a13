use chrono::{DateTime, Utc};
use httpmon_common::types::AlertEvent;
use httpmon_metrics::MetricsSnapshot;
use serde::Serialize;
use std::collections::BTreeSet;

/// Minimum width of a rendered column.
const MIN_COLUMN_WIDTH: usize = 10;
/// Padding after the longest entry in a column.
const COLUMN_PADDING: usize = 5;

/// A left-aligned text table whose columns grow to fit their widest entry.
#[derive(Debug, Default)]
struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    fn add_row(&mut self, columns: &[&str]) {
        self.rows.push(columns.iter().map(|c| c.to_string()).collect());
    }

    fn render(&self) -> String {
        let mut widths: Vec<usize> = Vec::new();
        for row in &self.rows {
            for (i, entry) in row.iter().enumerate() {
                let width = (entry.len() + COLUMN_PADDING).max(MIN_COLUMN_WIDTH);
                if widths.len() <= i {
                    widths.push(width);
                } else {
                    widths[i] = widths[i].max(width);
                }
            }
        }

        let mut out = String::new();
        for row in &self.rows {
            for (i, entry) in row.iter().enumerate() {
                out.push_str(entry);
                if i + 1 < row.len() {
                    for _ in 0..widths[i].saturating_sub(entry.len()) {
                        out.push(' ');
                    }
                }
            }
            out.push('\n');
        }
        out
    }
}

/// One periodic report: both snapshots, the invalid-line count and the
/// alert history, renderable as a text table or serialized as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub interval: MetricsSnapshot,
    pub lifetime: MetricsSnapshot,
    pub invalid_lines: u64,
    pub alerts: Vec<AlertEvent>,
}

impl Report {
    pub fn to_text(&self) -> String {
        let mut table = Table::default();
        table.add_row(&["metric", "interval", "lifetime"]);
        table.add_row(&[
            "total requests",
            &self.interval.total_requests.to_string(),
            &self.lifetime.total_requests.to_string(),
        ]);
        table.add_row(&[
            "success rate",
            &self.interval.success_percent(),
            &self.lifetime.success_percent(),
        ]);
        table.add_row(&[
            "requests/sec",
            &format!("{:.2}", self.interval.requests_per_second),
            &format!("{:.2}", self.lifetime.requests_per_second),
        ]);
        table.add_row(&[
            "busiest site",
            &busiest_site(&self.interval),
            &busiest_site(&self.lifetime),
        ]);
        table.add_row(&[
            "its sections",
            &sections(&self.interval),
            &sections(&self.lifetime),
        ]);

        let classes: BTreeSet<char> = self
            .interval
            .status_counts
            .keys()
            .chain(self.lifetime.status_counts.keys())
            .copied()
            .collect();
        for class in classes {
            table.add_row(&[
                &format!("status {class}xx"),
                &self
                    .interval
                    .status_counts
                    .get(&class)
                    .copied()
                    .unwrap_or(0)
                    .to_string(),
                &self
                    .lifetime
                    .status_counts
                    .get(&class)
                    .copied()
                    .unwrap_or(0)
                    .to_string(),
            ]);
        }
        table.add_row(&["invalid lines", "-", &self.invalid_lines.to_string()]);

        let mut out = format!(
            "== Traffic report at {} ==\n{}",
            self.generated_at.format("%d/%m/%Y %H:%M:%S"),
            table.render()
        );
        if self.alerts.is_empty() {
            out.push_str("No alerts triggered.\n");
        } else {
            out.push_str("Alert history:\n");
            for alert in &self.alerts {
                out.push_str(&format!("  {alert}\n"));
            }
        }
        out
    }
}

fn busiest_site(snapshot: &MetricsSnapshot) -> String {
    match &snapshot.max_site {
        Some(site) => format!("{} ({} hits)", site.host, site.hits),
        None => "None".to_string(),
    }
}

fn sections(snapshot: &MetricsSnapshot) -> String {
    match &snapshot.max_site {
        Some(site) => site.sections.join(", "),
        None => "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use httpmon_common::types::AlertKind;
    use httpmon_metrics::MaxSiteSnapshot;
    use std::collections::BTreeMap;

    fn make_snapshot(total: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: total,
            success_rate: 0.5,
            requests_per_second: 1.25,
            elapsed_secs: 10.0,
            max_site: Some(MaxSiteSnapshot {
                host: "a.example".to_string(),
                hits: total,
                sections: vec!["a.example/api".to_string()],
            }),
            status_counts: BTreeMap::from([('2', total / 2), ('5', total / 2)]),
        }
    }

    fn make_report() -> Report {
        Report {
            generated_at: Utc.with_ymd_and_hms(2024, 5, 9, 16, 0, 0).unwrap(),
            interval: make_snapshot(10),
            lifetime: make_snapshot(100),
            invalid_lines: 3,
            alerts: vec![AlertEvent::new(
                50,
                AlertKind::Critical,
                Utc.with_ymd_and_hms(2024, 5, 9, 15, 59, 0).unwrap(),
            )],
        }
    }

    #[test]
    fn table_columns_align_to_the_widest_entry() {
        let mut table = Table::default();
        table.add_row(&["a", "bb"]);
        table.add_row(&["a very long entry", "c"]);
        let rendered = table.render();

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        // Both second columns start at the same offset.
        assert_eq!(lines[0].find("bb"), lines[1].find('c'));
        // Long entries get the fixed padding after them.
        assert!(lines[1].starts_with("a very long entry     c"));
    }

    #[test]
    fn text_report_includes_metrics_and_alert_history() {
        let text = make_report().to_text();
        assert!(text.contains("== Traffic report at 09/05/2024 16:00:00 =="));
        assert!(text.contains("total requests"));
        assert!(text.contains("a.example (10 hits)"));
        assert!(text.contains("status 2xx"));
        assert!(text.contains("invalid lines"));
        assert!(text.contains("[CRITICAL] High traffic generated an alert - hits = 50"));
    }

    #[test]
    fn empty_history_renders_the_quiet_note() {
        let mut report = make_report();
        report.alerts.clear();
        assert!(report.to_text().contains("No alerts triggered."));
    }

    #[test]
    fn report_serializes_to_json() {
        let json = serde_json::to_string(&make_report()).unwrap();
        assert!(json.contains("\"total_requests\":10"));
        assert!(json.contains("\"invalid_lines\":3"));
        assert!(json.contains("\"kind\":\"critical\""));
    }
}

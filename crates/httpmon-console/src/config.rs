use httpmon_common::types::MonitorConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Path of the access log to tail.
    pub log_path: String,
    #[serde(default = "default_report_interval_millis")]
    pub report_interval_millis: u64,
    #[serde(default = "default_tail_poll_millis")]
    pub tail_poll_millis: u64,
    /// Emit reports as JSON instead of the text table.
    #[serde(default)]
    pub json_report: bool,
    /// Throughput monitors watching the request stream. Defaults to the
    /// classic 10 rps over a two-minute window, evaluated every second.
    #[serde(default = "default_monitors")]
    pub monitors: Vec<MonitorConfig>,
}

fn default_report_interval_millis() -> u64 {
    10_000
}

fn default_tail_poll_millis() -> u64 {
    250
}

fn default_monitors() -> Vec<MonitorConfig> {
    vec![MonitorConfig {
        rps_threshold: 10.0,
        window_millis: 120_000,
        poll_interval_millis: 1_000,
    }]
}

impl ConsoleConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: ConsoleConfig = toml::from_str(r#"log_path = "/tmp/access.log""#).unwrap();
        assert_eq!(config.log_path, "/tmp/access.log");
        assert_eq!(config.report_interval_millis, 10_000);
        assert_eq!(config.tail_poll_millis, 250);
        assert!(!config.json_report);
        assert_eq!(config.monitors.len(), 1);
        assert_eq!(config.monitors[0].rps_threshold, 10.0);
        assert_eq!(config.monitors[0].window_millis, 120_000);
    }

    #[test]
    fn full_config_overrides_everything() {
        let config: ConsoleConfig = toml::from_str(
            r#"
            log_path = "/var/log/access.log"
            report_interval_millis = 5000
            tail_poll_millis = 100
            json_report = true

            [[monitors]]
            rps_threshold = 10.0
            window_millis = 5000
            poll_interval_millis = 500

            [[monitors]]
            rps_threshold = 100.0
            window_millis = 60000
            poll_interval_millis = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.report_interval_millis, 5000);
        assert!(config.json_report);
        assert_eq!(config.monitors.len(), 2);
        assert_eq!(config.monitors[1].rps_threshold, 100.0);
        assert_eq!(config.monitors[1].poll_interval_millis, 1000);
    }
}

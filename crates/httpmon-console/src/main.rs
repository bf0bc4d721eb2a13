mod config;
mod render;

use anyhow::Result;
use chrono::Utc;
use httpmon_metrics::MetricManager;
use httpmon_parser::parse_line;
use httpmon_tail::LogTailer;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing_subscriber::EnvFilter;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  httpmon-console [config.toml]    Tail the configured access log and report traffic");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("httpmon=info".parse()?))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/console.toml".to_string());
    if matches!(config_path.as_str(), "-h" | "--help") {
        print_usage();
        return Ok(());
    }

    let config = config::ConsoleConfig::load(&config_path)?;

    let mut manager = MetricManager::new(Utc::now());
    for monitor in &config.monitors {
        manager.add_monitor(*monitor)?;
    }
    let manager = Arc::new(manager);

    // Existence is checked up front; new lines are picked up from here on.
    let tailer = LogTailer::from_end(&config.log_path)?;
    tracing::info!(
        path = %config.log_path,
        monitors = config.monitors.len(),
        report_interval_millis = config.report_interval_millis,
        "httpmon-console starting"
    );

    let (tx, mut rx) = mpsc::channel::<String>(1024);
    let tail_poll_millis = config.tail_poll_millis;
    let tail_task = tokio::spawn(async move {
        if let Err(e) = tailer.run(tx, tail_poll_millis).await {
            tracing::error!(error = %e, "Tailer stopped");
        }
    });

    // One evaluation task per monitor, each at its own cadence.
    for (index, monitor) in manager.monitor_configs().into_iter().enumerate() {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move {
            let mut tick = interval(Duration::from_millis(monitor.poll_interval_millis));
            loop {
                tick.tick().await;
                if let Err(e) = manager.evaluate_monitor(index, Utc::now()) {
                    tracing::error!(monitor = index, error = %e, "Window evaluation failed");
                }
            }
        });
    }

    let mut report_tick = interval(Duration::from_millis(config.report_interval_millis));
    report_tick.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            line = rx.recv() => {
                match line {
                    Some(line) => ingest(&manager, &line),
                    None => {
                        tracing::warn!("Line source closed, shutting down");
                        break;
                    }
                }
            }
            _ = report_tick.tick() => {
                report(&manager, config.json_report)?;
                manager.flush_interval(Utc::now());
            }
            _ = signal::ctrl_c() => {
                tracing::info!("Shutting down gracefully");
                break;
            }
        }
    }

    tail_task.abort();
    Ok(())
}

/// Parses one raw line and feeds it to the manager. Malformed lines are
/// counted and skipped; they never abort ingestion.
fn ingest(manager: &MetricManager, line: &str) {
    match parse_line(line) {
        Ok(record) => manager.analyze(&record, Utc::now()),
        Err(e) => {
            manager.record_invalid_line();
            tracing::debug!(error = %e, line, "Skipping malformed line");
        }
    }
}

#[allow(clippy::print_stdout)]
fn report(manager: &MetricManager, as_json: bool) -> Result<()> {
    let now = Utc::now();
    let report = render::Report {
        generated_at: now,
        interval: manager.current_snapshot(now),
        lifetime: manager.lifetime_snapshot(now),
        invalid_lines: manager.invalid_lines(),
        alerts: manager.alert_history(),
    };
    if as_json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{}", report.to_text());
    }
    Ok(())
}

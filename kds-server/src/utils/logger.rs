//! Logging Infrastructure
//!
//! Structured logging setup for development (pretty console) and production
//! (JSON console). When a log directory is given, application logs are also
//! written to a daily rotating file and removed after 14 days.

use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, prelude::*};

/// Days an application log file is kept
const LOG_RETENTION_DAYS: i64 = 14;

/// Log file name prefix (`kds.YYYY-MM-DD`)
const LOG_FILE_PREFIX: &str = "kds";

/// Clean up application log files older than the retention window
///
/// Call this periodically (e.g., hourly) to maintain log size
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(LOG_RETENTION_DAYS);
    let mut removed = 0;

    if !log_dir.exists() {
        return Ok(removed);
    }

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        // Match kds.YYYY-MM-DD pattern
        if let Some(date_part) = name
            .strip_prefix(LOG_FILE_PREFIX)
            .and_then(|d| d.strip_prefix('.'))
            && let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }

    Ok(removed)
}

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "kds_server=debug")
/// * `json_format` - JSON console output (production) instead of pretty output
/// * `log_dir` - Optional directory for rotating file logs
///
/// `RUST_LOG` overrides `level` when set.
///
/// # Examples
/// ```no_run
/// # use kds_server::init_logger_with_file;
/// // Development setup (console only)
/// init_logger_with_file("debug", false, None)?;
///
/// // Production setup (console + file)
/// init_logger_with_file("info", true, Some("./work_dir/logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let file_layer = match log_dir {
        Some(dir) => {
            let log_dir = Path::new(dir);
            fs::create_dir_all(log_dir)?;

            let app_log = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(app_log));

            Some(if json_format { layer.json().boxed() } else { layer.boxed() })
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// Periodic cleanup task - runs every hour to clean old logs
pub async fn periodic_cleanup(log_dir: PathBuf, shutdown: CancellationToken) {
    use tokio::time::{Duration, sleep};

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = sleep(Duration::from_secs(3600)) => {
                match cleanup_old_logs(&log_dir) {
                    Ok(0) => {}
                    Ok(removed) => tracing::info!(removed, "Old log files removed"),
                    Err(e) => tracing::error!(error = %e, "Failed to cleanup old logs"),
                }
            }
        }
    }
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

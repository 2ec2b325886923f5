//! Logging Infrastructure
//!
//! Console logging (pretty in development, JSON in production) plus optional daily rotating
//! application log files. Notification mail goes to its own `mail` file so deliveries can be
//! audited separately.

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, prelude::*};

/// Days an application log file is kept
const LOG_RETENTION_DAYS: i64 = 14;

/// Clean up old application log files (older than 14 days)
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(LOG_RETENTION_DAYS);
    let mut removed = 0;

    for sub in ["app", "mail"] {
        let dir = log_dir.join(sub);
        if !dir.exists() {
            continue;
        }
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            // Match {sub}.YYYY-MM-DD (tracing-appender daily naming)
            let Some(date_part) = name
                .strip_prefix(sub)
                .and_then(|rest| rest.strip_prefix('.'))
            else {
                continue;
            };
            if let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                && date < cutoff
            {
                fs::remove_file(&path)?;
                removed += 1;
                tracing::info!(file = %name, "Deleted old log file");
            }
        }
    }

    Ok(removed)
}

/// Initialize the logging system with daily rotating logs
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn"); `RUST_LOG` takes precedence
/// * `json_format` - Whether to use JSON format (true for production, false for development)
/// * `log_dir` - Optional directory for file logging (e.g., Some("./logs"))
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

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

    let Some(dir) = log_dir else {
        subscriber.with(console_layer).try_init()?;
        return Ok(());
    };

    let log_dir = Path::new(dir);
    let app_log_dir = log_dir.join("app");
    let mail_log_dir = log_dir.join("mail");
    fs::create_dir_all(&app_log_dir)?;
    fs::create_dir_all(&mail_log_dir)?;

    // Application logs (rotated daily, subject to 14-day cleanup)
    let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
    let app_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::sync::Mutex::new(app_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() != "mail"
        }));

    // Outgoing mail
    let mail_log = RollingFileAppender::new(Rotation::DAILY, mail_log_dir, "mail");
    let mail_layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(mail_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() == "mail"
        }));

    tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));

    subscriber
        .with(console_layer)
        .with(app_layer)
        .with(mail_layer)
        .try_init()?;

    Ok(())
}

/// Periodic cleanup task - runs every hour to clean old logs
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_expired_files() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        fs::create_dir_all(&app).unwrap();

        let old = app.join("app.2000-01-01");
        let today = app.join(format!("app.{}", chrono::Utc::now().format("%Y-%m-%d")));
        let other = app.join("notes.txt");
        for f in [&old, &today, &other] {
            fs::write(f, b"x").unwrap();
        }

        let removed = cleanup_old_logs(dir.path()).unwrap();
        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(today.exists());
        assert!(other.exists());
    }

    #[test]
    fn test_cleanup_missing_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 0);
    }
}

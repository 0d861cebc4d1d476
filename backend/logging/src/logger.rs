//! Structured Logger
//!
//! Wraps `tracing` with a console layer, a daily rolling file layer
//! (plain text or NDJSON), and `RUST_LOG`-based level control.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Open the rolling log file. Files are named `snowberry.YYYY-MM-DD.log`.
fn open_log_file(log_dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("snowberry")
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to open log directory {}", log_dir.display()))
}

/// Initialize the global logger. `RUST_LOG` overrides `level` when set.
/// Calling it again after a subscriber is installed is a no-op.
///
/// When the log file cannot be opened the console layer is still
/// installed and the error is returned for the caller to report.
pub fn init_logger(log_dir: &Path, level: &str, json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_appender, file_error) = match open_log_file(log_dir) {
        Ok(appender) => (Some(appender), None),
        Err(e) => (None, Some(e)),
    };

    let (json_layer, text_layer) = match file_appender {
        Some(appender) if json => {
            let layer = fmt::layer().json().with_writer(appender).with_ansi(false);
            (Some(layer), None)
        }
        Some(appender) => {
            let layer = fmt::layer().with_writer(appender).with_ansi(false);
            (None, Some(layer))
        }
        None => (None, None),
    };

    // Console goes to stderr; stdout carries command output.
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(json_layer)
        .with(text_layer)
        .try_init();

    match file_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_blocked_by_file() {
        let root = tempfile::TempDir::new().unwrap();
        let blocker = root.path().join("logs");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = init_logger(&blocker.join("nested"), "info", false).unwrap_err();
        assert!(err.to_string().contains("log directory"));
    }

    #[test]
    fn test_open_log_file_creates_dir() {
        let root = tempfile::TempDir::new().unwrap();
        let dir = root.path().join("a").join("b");
        open_log_file(&dir).unwrap();
        assert!(dir.is_dir());
    }
}

//! Logging system initialization
//!
//! Builds the tracing subscriber from `LoggingConfig`.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::{LogFormat, LoggingConfig};
use crate::errors::{MetricsError, Result};

/// Initialize logging based on configuration
///
/// Writes to stdout, or to a daily-rotated file when `file` is set.
/// If a global subscriber is already installed (e.g. by the host) the
/// existing one is kept.
///
/// # Returns
/// * `WorkerGuard` - Must be kept alive for the duration of the program
///   to ensure non-blocking log writes are flushed
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let writer: Box<dyn std::io::Write + Send + Sync> = match config.file.as_deref() {
        Some(log_file) => {
            let path = Path::new(log_file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let filename = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("promrelay.log");
            let appender = rolling::Builder::new()
                .rotation(rolling::Rotation::DAILY)
                .filename_prefix(filename.trim_end_matches(".log"))
                .filename_suffix("log")
                .build(dir)
                .map_err(|e| {
                    MetricsError::configuration(format!(
                        "failed to create log appender for '{}': {}",
                        log_file, e
                    ))
                })?;
            Box::new(appender)
        }
        None => Box::new(std::io::stdout()),
    };

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level).map_err(|e| {
        MetricsError::configuration(format!("invalid LOG_LEVEL '{}': {}", config.level, e))
    })?;

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(config.file.is_none());

    let installed = match config.format {
        LogFormat::Json => subscriber_builder.json().try_init().is_ok(),
        LogFormat::Text => subscriber_builder.try_init().is_ok(),
    };
    if !installed {
        tracing::debug!("global subscriber already set, keeping it");
    }

    Ok(guard)
}

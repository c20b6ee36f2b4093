//! Logging setup with optional daily file rotation.

use crate::error::{AppError, Result as AppResult};

use std::path::{Path, PathBuf};

use dbs_config::LoggingConfig;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_SUFFIX: &str = "log";
const MAX_LOG_FILES: usize = 7;

/// Install the global subscriber.
///
/// # Log Layers
/// - Console: always on, colored when configured
/// - File: only when `logging.file` is set; daily rotation under `log_dir`
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn initialize(logging: &LoggingConfig, log_dir: &Path) -> AppResult<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(logging.level.0.into())
        .from_env_lossy();

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(logging.colored);

    let file_layer = match logging.file.as_deref() {
        Some(prefix) => {
            std::fs::create_dir_all(log_dir).map_err(|e| AppError::Logging {
                message: format!("cannot create {}: {e}", log_dir.display()),
            })?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(MAX_LOG_FILES)
                .filename_prefix(prefix)
                .filename_suffix(LOG_FILE_SUFFIX)
                .build(log_dir)
                .map_err(|e| AppError::Logging {
                    message: e.to_string(),
                })?;

            Some(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
                    .with_writer(file_appender),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Logging {
            message: e.to_string(),
        })?;

    match logging.file.as_deref() {
        Some(prefix) => info!(
            "Logger initialized: level={}, file={}",
            logging.level,
            current_log_path(log_dir, prefix).display()
        ),
        None => info!("Logger initialized: level={}, console", logging.level),
    }

    Ok(())
}

/// Path of today's log file.
pub fn current_log_path(log_dir: &Path, prefix: &str) -> PathBuf {
    let today = chrono::Utc::now().format("%Y-%m-%d");
    log_dir.join(format!("{prefix}.{today}.{LOG_FILE_SUFFIX}"))
}

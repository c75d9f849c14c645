//! Tracing subscriber setup (console + optional rolling file).

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{AppConfig, LoggingConfig};

/// Resolve the directory used for log files.
pub fn log_dir(config: &LoggingConfig) -> PathBuf {
    if let Some(dir) = &config.directory {
        return dir.clone();
    }
    AppConfig::project_dirs()
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Build the env filter: `RUST_LOG` wins, otherwise the configured level.
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase()))
}

/// Initialize logging.
///
/// The returned guard flushes the file writer on drop and must be kept
/// alive for the lifetime of the process.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let console = fmt::layer().with_target(false);

    if !config.file_enabled {
        tracing_subscriber::registry()
            .with(env_filter(config))
            .with(console)
            .init();
        return None;
    }

    let dir = log_dir(config);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing_subscriber::registry()
            .with(env_filter(config))
            .with(console)
            .init();
        tracing::warn!("File logging disabled, cannot create {:?}: {}", dir, e);
        return None;
    }

    let appender = tracing_appender::rolling::daily(&dir, "hris-desk.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(console)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();

    tracing::debug!("Writing logs to {:?}", dir);
    Some(guard)
}

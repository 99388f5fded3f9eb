//! Process-wide log stream initialization.
//!
//! Sets up the `tracing` subscriber that backs the shared stream every
//! request forwards its records to (via [`crate::sink::TracingSink`]).
//! Supports JSON and pretty-printed formats with an optional file
//! output path.

use std::path::PathBuf;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Rendering of the shared stream.
///
/// Aggregation pipelines want one JSON object per line; humans reading
/// a terminal want the pretty layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Configuration for the shared stream, normally loaded from
/// `REQLOG_*` variables by [`crate::config::load_log_config`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive string. `"info"` keeps request summaries
    /// and drops the per-stage debug records; `"reqlog=debug"` keeps
    /// everything this crate emits.
    pub level: String,
    /// Write to this file instead of stderr when set.
    pub output_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
            output_path: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid level filter: {0}")]
    InvalidFilter(String),
    #[error("cannot open log file: {0}")]
    FileOpen(String),
    #[error("a subscriber is already installed for this process")]
    AlreadyInitialized,
}

/// Initialize the tracing subscriber with the given configuration.
///
/// Called once at process startup, before the first request logger is
/// created.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LogError::InvalidFilter(e.to_string()))?;

    match (&config.output_path, config.format) {
        (Some(path), format) => {
            let file = std::fs::File::create(path)
                .map_err(|e| LogError::FileOpen(e.to_string()))?;
            let writer = std::sync::Mutex::new(file);
            let registry = tracing_subscriber::registry().with(filter);
            match format {
                LogFormat::Json => registry
                    .with(fmt::layer().json().with_writer(writer))
                    .try_init(),
                LogFormat::Pretty => registry
                    .with(fmt::layer().pretty().with_ansi(false).with_writer(writer))
                    .try_init(),
            }
            .map_err(|_| LogError::AlreadyInitialized)
        }
        (None, LogFormat::Json) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized),
        (None, LogFormat::Pretty) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized),
    }
}

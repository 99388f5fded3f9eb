//! Configuration loading from environment variables.
//!
//! All values are loaded from `REQLOG_*` environment variables with
//! sensible defaults. Invalid values fall back to defaults without
//! crashing, except sink endpoints, which are validated fail-fast at
//! sink construction.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `REQLOG_LEVEL` | info | Log level filter for the process-wide stream |
//! | `REQLOG_FORMAT` | json | Output format: `json` or `pretty` |
//! | `REQLOG_LOG_FILE` | (unset) | File path for log output; stderr if unset |
//! | `REQLOG_AGGREGATOR_ADDR` | (unset) | Aggregation endpoint `host:port`; sink disabled if unset |
//! | `REQLOG_AGGREGATOR_QUEUE` | 1024 | Bounded delivery queue capacity |

use std::path::PathBuf;

use crate::logging::{LogConfig, LogFormat};

/// Aggregation sink configuration.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Endpoint of the external aggregation service, `host:port`. The
    /// sink capability is disabled when unset.
    pub aggregator_addr: Option<String>,
    /// Capacity of the bounded delivery queue between the request path
    /// and the transport.
    pub queue_capacity: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            aggregator_addr: None,
            queue_capacity: 1024,
        }
    }
}

/// All configuration loaded from environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub log: LogConfig,
    pub sink: SinkConfig,
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Read a string env var, treating empty as unset.
fn parse_opt_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Load sink configuration from environment.
pub fn load_sink_config() -> SinkConfig {
    SinkConfig {
        aggregator_addr: parse_opt_string("REQLOG_AGGREGATOR_ADDR"),
        queue_capacity: parse_usize("REQLOG_AGGREGATOR_QUEUE", 1024),
    }
}

/// Load logging configuration from environment.
pub fn load_log_config() -> LogConfig {
    let format = match std::env::var("REQLOG_FORMAT").as_deref() {
        Ok("pretty") => LogFormat::Pretty,
        _ => LogFormat::Json,
    };
    LogConfig {
        format,
        level: parse_opt_string("REQLOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        output_path: parse_opt_string("REQLOG_LOG_FILE").map(PathBuf::from),
    }
}

/// Load the full configuration from environment.
pub fn load_env_config() -> EnvConfig {
    EnvConfig {
        log: load_log_config(),
        sink: load_sink_config(),
    }
}

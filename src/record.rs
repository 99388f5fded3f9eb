//! Log record and severity types.
//!
//! A [`LogRecord`] is one logging event produced during a request's
//! lifetime. Records are immutable once created and owned by the
//! per-request buffer until the request finishes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// Severity levels for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Captured error payload attached to a record.
///
/// `trace` is the flattened source chain of the originating error, one
/// cause per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
    pub trace: String,
}

impl ErrorInfo {
    /// Capture an error and its source chain.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let message = err.to_string();
        let mut trace = message.clone();
        let mut source = err.source();
        while let Some(cause) = source {
            trace.push_str("\ncaused by: ");
            trace.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message, trace }
    }
}

/// One logging event.
///
/// `name` is the logical source name, already decorated with the request
/// correlation identifier by the time the record reaches any sink. The
/// `stage` slot is populated only for the debug record emitted when a
/// timing checkpoint is tagged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub message: String,
    pub name: String,
    pub handler: Option<String>,
    pub stage: Option<Stage>,
    pub fields: Vec<(String, String)>,
    pub error: Option<ErrorInfo>,
}

impl LogRecord {
    /// Create a record with the current wall-clock timestamp and no
    /// optional payloads.
    pub fn new(level: Severity, message: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            name: name.into(),
            handler: None,
            stage: None,
            fields: Vec::new(),
            error: None,
        }
    }

    /// Timestamp formatted as `YYYY-MM-DD HH:MM:SS,mmm`, the line prefix
    /// used in aggregated output.
    pub fn format_time(&self) -> String {
        format!(
            "{},{:03}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.timestamp.timestamp_subsec_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "connection refused")
        }
    }

    impl std::error::Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "query failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Error);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert!(Severity::Info > Severity::Debug);
    }

    #[test]
    fn test_severity_as_str() {
        assert_eq!(Severity::Debug.as_str(), "DEBUG");
        assert_eq!(Severity::Warning.as_str(), "WARNING");
        assert_eq!(Severity::Critical.as_str(), "CRITICAL");
    }

    #[test]
    fn test_error_info_source_chain() {
        let err = Outer(Inner);
        let info = ErrorInfo::from_error(&err);
        assert_eq!(info.message, "query failed");
        assert_eq!(info.trace, "query failed\ncaused by: connection refused");
    }

    #[test]
    fn test_format_time_shape() {
        let record = LogRecord::new(Severity::Info, "hello", "app");
        let formatted = record.format_time();
        // "2024-01-01 00:00:00,000" is 23 characters
        assert_eq!(formatted.len(), 23);
        assert_eq!(&formatted[19..20], ",");
    }
}

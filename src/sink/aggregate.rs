//! Aggregated summary event construction.
//!
//! At request finish every deferred sink receives one [`AggregatedEvent`]
//! synthesized from the full record buffer and the stage list. The
//! construction is deterministic; see [`build_aggregated_event`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::{ErrorInfo, LogRecord, Severity};
use crate::stage::Stage;

/// One summary event for a finished request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedEvent {
    /// Highest-severity record's message, with the last error trace
    /// appended if any record carried one.
    pub representative_message: String,
    /// Maximum severity across the buffer, at least `Info`.
    pub representative_level: Severity,
    /// Every record formatted as `timestamp LEVEL message`, one line per
    /// record in chronological order.
    pub full_message: String,
    /// Error payload of the last record that carried one.
    pub last_error: Option<ErrorInfo>,
    /// Logical handler that processed the request, if bound.
    pub handler: Option<String>,
    pub status_code: u16,
    /// `<stage_name>_stage` keys mapped to truncated integer
    /// milliseconds. For duplicate stage names the last stage wins.
    pub stage_fields: BTreeMap<String, u64>,
}

/// Build the summary event for one finished request.
///
/// Returns `None` for an empty buffer: no records means no event.
///
/// The representative message starts as `"{method} {uri} {status}"` at
/// `Info` severity and is replaced by the message of any record whose
/// severity strictly exceeds the running maximum, so the first record at
/// the final maximum wins. The last error payload in the buffer wins and
/// its trace is appended to the representative text.
pub fn build_aggregated_event(
    records: &[LogRecord],
    stages: &[Stage],
    status_code: u16,
    method: &str,
    uri: &str,
) -> Option<AggregatedEvent> {
    if records.is_empty() {
        return None;
    }

    let mut event = AggregatedEvent {
        representative_message: format!("{} {} {}", method, uri, status_code),
        representative_level: Severity::Info,
        full_message: String::new(),
        last_error: None,
        handler: None,
        status_code,
        stage_fields: BTreeMap::new(),
    };

    for record in records {
        if event.handler.is_none() {
            event.handler = record.handler.clone();
        }

        event.full_message.push_str(&format!(
            "{} {} {}\n",
            record.format_time(),
            record.level.as_str(),
            record.message
        ));

        if record.level > event.representative_level {
            event.representative_level = record.level;
            event.representative_message = record.message.clone();
        }

        if let Some(error) = &record.error {
            event.last_error = Some(error.clone());
            event.representative_message.push('\n');
            event.representative_message.push_str(&error.trace);
        }
    }

    for stage in stages {
        event
            .stage_fields
            .insert(format!("{}_stage", stage.name), stage.delta_millis());
    }

    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn record(level: Severity, message: &str) -> LogRecord {
        LogRecord::new(level, message, "test.req-1")
    }

    #[test]
    fn test_empty_buffer_builds_no_event() {
        assert!(build_aggregated_event(&[], &[], 200, "GET", "/").is_none());
    }

    #[test]
    fn test_representative_is_request_line_when_all_info() {
        let records = vec![record(Severity::Info, "start"), record(Severity::Info, "end")];
        let event = build_aggregated_event(&records, &[], 200, "GET", "/users").unwrap();
        assert_eq!(event.representative_message, "GET /users 200");
        assert_eq!(event.representative_level, Severity::Info);
    }

    #[test]
    fn test_highest_severity_record_wins() {
        let records = vec![
            record(Severity::Info, "start"),
            record(Severity::Error, "boom"),
            record(Severity::Info, "end"),
        ];
        let event = build_aggregated_event(&records, &[], 500, "GET", "/").unwrap();
        assert_eq!(event.representative_message, "boom");
        assert_eq!(event.representative_level, Severity::Error);
    }

    #[test]
    fn test_first_record_at_maximum_wins() {
        let records = vec![
            record(Severity::Error, "first failure"),
            record(Severity::Error, "second failure"),
        ];
        let event = build_aggregated_event(&records, &[], 500, "GET", "/").unwrap();
        assert_eq!(event.representative_message, "first failure");
    }

    #[test]
    fn test_full_message_keeps_chronological_order() {
        let records = vec![
            record(Severity::Info, "one"),
            record(Severity::Debug, "two"),
            record(Severity::Warning, "three"),
        ];
        let event = build_aggregated_event(&records, &[], 200, "GET", "/").unwrap();
        let lines: Vec<&str> = event.full_message.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("INFO one"));
        assert!(lines[1].ends_with("DEBUG two"));
        assert!(lines[2].ends_with("WARNING three"));
    }

    #[test]
    fn test_last_error_wins_and_trace_is_appended() {
        let mut first = record(Severity::Error, "first");
        first.error = Some(ErrorInfo {
            message: "a".to_string(),
            trace: "trace-a".to_string(),
        });
        let mut second = record(Severity::Warning, "second");
        second.error = Some(ErrorInfo {
            message: "b".to_string(),
            trace: "trace-b".to_string(),
        });

        let event =
            build_aggregated_event(&[first, second], &[], 500, "POST", "/submit").unwrap();
        assert_eq!(event.last_error.as_ref().unwrap().message, "b");
        assert!(event.representative_message.starts_with("first"));
        assert!(event.representative_message.ends_with("trace-b"));
    }

    #[test]
    fn test_no_error_records_leave_last_error_absent() {
        let records = vec![record(Severity::Info, "ok")];
        let event = build_aggregated_event(&records, &[], 200, "GET", "/").unwrap();
        assert!(event.last_error.is_none());
    }

    #[test]
    fn test_stage_fields_use_suffixed_keys_and_truncated_millis() {
        let stages = vec![
            Stage {
                name: "db".to_string(),
                delta: Duration::from_micros(12_700),
                start_delta: Duration::ZERO,
            },
            Stage {
                name: "render".to_string(),
                delta: Duration::from_micros(3_500),
                start_delta: Duration::from_micros(12_700),
            },
        ];
        let records = vec![record(Severity::Info, "done")];
        let event = build_aggregated_event(&records, &stages, 200, "GET", "/").unwrap();
        assert_eq!(event.stage_fields.get("db_stage"), Some(&12));
        assert_eq!(event.stage_fields.get("render_stage"), Some(&3));
    }

    #[test]
    fn test_duplicate_stage_names_last_wins() {
        let stages = vec![
            Stage {
                name: "db".to_string(),
                delta: Duration::from_millis(10),
                start_delta: Duration::ZERO,
            },
            Stage {
                name: "db".to_string(),
                delta: Duration::from_millis(4),
                start_delta: Duration::from_millis(10),
            },
        ];
        let records = vec![record(Severity::Info, "done")];
        let event = build_aggregated_event(&records, &stages, 200, "GET", "/").unwrap();
        assert_eq!(event.stage_fields.get("db_stage"), Some(&4));
        assert_eq!(event.stage_fields.len(), 1);
    }

    #[test]
    fn test_handler_comes_from_first_record_carrying_one() {
        let mut first = record(Severity::Info, "start");
        first.handler = None;
        let mut second = record(Severity::Info, "mid");
        second.handler = Some("UsersPage".to_string());
        let mut third = record(Severity::Info, "end");
        third.handler = Some("OtherPage".to_string());

        let event =
            build_aggregated_event(&[first, second, third], &[], 200, "GET", "/").unwrap();
        assert_eq!(event.handler.as_deref(), Some("UsersPage"));
    }
}

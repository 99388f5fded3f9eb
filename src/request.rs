//! Per-request logging facade.
//!
//! One [`RequestLogger`] is created per in-flight request and owns that
//! request's record buffer and stage tracker. Instances share nothing
//! with each other; only the injected process-wide sink set is shared,
//! and it synchronizes internally.

use std::sync::Arc;

use crate::buffer::RecordBuffer;
use crate::context::{ContextFilter, RequestContext};
use crate::record::{ErrorInfo, LogRecord, Severity};
use crate::sink::{BulkSink, DeliveryMode, SharedSinks};
use crate::stage::{Stage, StageTracker};

const DEFAULT_SOURCE: &str = "handler";

/// Facade over one request's buffer, stage tracker, and correlation
/// context.
///
/// Dropping the logger without calling [`finish`](Self::finish) discards
/// the buffer; deferred sinks never receive a partial aggregation for an
/// abandoned request. A host that wants abandonment visible downstream
/// calls `finish` with a sentinel status instead.
pub struct RequestLogger {
    context: RequestContext,
    filter: ContextFilter,
    source: String,
    handler: Option<String>,
    tracker: StageTracker,
    buffer: RecordBuffer,
    shared: SharedSinks,
}

impl RequestLogger {
    /// Create the logger for a request, binding the process-wide sink
    /// set it forwards every record to.
    pub fn new(context: RequestContext, shared: SharedSinks) -> Self {
        let filter = ContextFilter::new(context.request_id.clone());
        let tracker = StageTracker::new(context.start_time);
        Self {
            context,
            filter,
            source: DEFAULT_SOURCE.to_string(),
            handler: None,
            tracker,
            buffer: RecordBuffer::new(),
            shared,
        }
    }

    /// Override the logical source name records are emitted under.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn request_id(&self) -> &str {
        &self.context.request_id
    }

    /// Bind the logical handler identifier used in correlation and in
    /// aggregated summaries. Re-registration overwrites; callers are
    /// expected to bind once per request.
    pub fn register_handler(&mut self, handler: impl Into<String>) {
        self.handler = Some(handler.into());
    }

    /// Subscribe a sink on the underlying buffer.
    pub fn add_bulk_handler(&mut self, sink: Arc<dyn BulkSink>, eager: bool) {
        let mode = if eager {
            DeliveryMode::Eager
        } else {
            DeliveryMode::Deferred
        };
        self.buffer.register_sink(sink, mode);
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.log(Severity::Debug, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.log(Severity::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.log(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.log(Severity::Error, message);
    }

    pub fn critical(&mut self, message: impl Into<String>) {
        self.log(Severity::Critical, message);
    }

    /// Emit a record at the given severity.
    pub fn log(&mut self, level: Severity, message: impl Into<String>) {
        let record = self.make_record(level, message.into());
        self.dispatch(record);
    }

    /// Emit a record carrying caller-supplied structured fields.
    pub fn log_with(
        &mut self,
        level: Severity,
        message: impl Into<String>,
        fields: &[(&str, &str)],
    ) {
        let mut record = self.make_record(level, message.into());
        record.fields = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.dispatch(record);
    }

    /// Emit an error record with the error's payload attached; the last
    /// such payload in the buffer ends up on the aggregated event.
    pub fn error_with(
        &mut self,
        message: impl Into<String>,
        err: &(dyn std::error::Error + 'static),
    ) {
        let mut record = self.make_record(Severity::Error, message.into());
        record.error = Some(ErrorInfo::from_error(err));
        self.dispatch(record);
    }

    /// Record a timing checkpoint and emit the debug record carrying it.
    pub fn stage_tag(&mut self, name: impl Into<String>) {
        let stage = self.tracker.stage_tag(name);
        let mut record = self.make_record(
            Severity::Debug,
            format!("stage \"{}\" completed in {:.2}ms", stage.name, stage.delta_ms()),
        );
        record.stage = Some(stage);
        self.dispatch(record);
    }

    /// Emit the informational timing summary: every stage's name=delta
    /// pair, the running total, and the status code. Independent of any
    /// deferred-sink aggregation.
    pub fn log_stages(&mut self, status_code: u16) {
        let handler = self.handler.as_deref().unwrap_or("unknown").to_string();
        let message = stage_summary(&handler, self.tracker.stages(), status_code);
        self.log(Severity::Info, message);
    }

    pub fn stages(&self) -> &[Stage] {
        self.tracker.stages()
    }

    /// Sum of all recorded stage deltas.
    pub fn get_total(&self) -> std::time::Duration {
        self.tracker.total()
    }

    /// Terminal operation: deliver the aggregated event to deferred
    /// sinks. Call exactly once, at request end; a repeated call is a
    /// reported no-op.
    pub fn finish(&mut self, status_code: u16, method: &str, uri: &str) {
        self.buffer.flush(status_code, self.tracker.stages(), method, uri);
    }

    fn make_record(&self, level: Severity, message: String) -> LogRecord {
        let mut record = LogRecord::new(level, message, self.filter.decorate(&self.source));
        record.handler = self.handler.clone();
        record
    }

    fn dispatch(&mut self, record: LogRecord) {
        self.shared.forward(&record);
        self.buffer.append(record);
    }
}

/// Render the timing summary line: every stage's `name=delta` pair in
/// fractional milliseconds, the running total, and the status code.
pub fn stage_summary(handler: &str, stages: &[Stage], status_code: u16) -> String {
    let stages_str = stages
        .iter()
        .map(|s| format!("{}={:.2}", s.name, s.delta_ms()))
        .collect::<Vec<_>>()
        .join(" ");
    let total_ms: f64 = stages.iter().map(Stage::delta_ms).sum();
    format!(
        "timings for {} : {} total={:.2} code={}",
        handler, stages_str, total_ms, status_code
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn logger() -> RequestLogger {
        RequestLogger::new(RequestContext::new("req-42"), SharedSinks::new())
    }

    #[test]
    fn test_records_are_correlated_with_request_id() {
        let capture = Arc::new(MemorySink::new());
        let mut log = logger();
        log.add_bulk_handler(capture.clone(), true);

        log.info("hello");

        let records = capture.records();
        assert_eq!(records[0].name, "handler.req-42");
    }

    #[test]
    fn test_custom_source_is_decorated() {
        let capture = Arc::new(MemorySink::new());
        let mut log = logger().with_source("handler.db");
        log.add_bulk_handler(capture.clone(), true);

        log.info("query done");

        assert_eq!(capture.records()[0].name, "handler.db.req-42");
    }

    #[test]
    fn test_records_reach_process_wide_sinks() {
        let shared = SharedSinks::new();
        let capture = Arc::new(MemorySink::new());
        shared.register(capture.clone());

        let mut log = RequestLogger::new(RequestContext::new("req-1"), shared);
        log.info("hello");
        log.error("boom");

        assert_eq!(capture.records().len(), 2);
    }

    #[test]
    fn test_stage_tag_emits_debug_record_with_stage() {
        let capture = Arc::new(MemorySink::new());
        let mut log = logger();
        log.add_bulk_handler(capture.clone(), true);

        log.stage_tag("db");

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Severity::Debug);
        assert!(records[0].message.starts_with("stage \"db\" completed in"));
        assert_eq!(records[0].stage.as_ref().unwrap().name, "db");
    }

    #[test]
    fn test_register_handler_attaches_to_records() {
        let capture = Arc::new(MemorySink::new());
        let mut log = logger();
        log.add_bulk_handler(capture.clone(), true);

        log.info("before");
        log.register_handler("UsersPage");
        log.info("after");

        let records = capture.records();
        assert!(records[0].handler.is_none());
        assert_eq!(records[1].handler.as_deref(), Some("UsersPage"));
    }

    #[test]
    fn test_stage_summary_message_shape() {
        use std::time::Duration;

        let stages = vec![
            Stage {
                name: "db".to_string(),
                delta: Duration::from_micros(12_000),
                start_delta: Duration::ZERO,
            },
            Stage {
                name: "render".to_string(),
                delta: Duration::from_micros(3_500),
                start_delta: Duration::from_micros(12_000),
            },
        ];
        let message = stage_summary("UsersPage", &stages, 200);
        assert!(message.contains("db=12.00 render=3.50 total=15.50 code=200"));
        assert!(message.starts_with("timings for UsersPage"));
    }

    #[test]
    fn test_log_with_carries_fields() {
        let capture = Arc::new(MemorySink::new());
        let mut log = logger();
        log.add_bulk_handler(capture.clone(), true);

        log.log_with(Severity::Info, "lookup", &[("table", "users"), ("rows", "3")]);

        let fields = &capture.records()[0].fields;
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], ("table".to_string(), "users".to_string()));
    }
}

//! Per-request record buffer and sink dispatch.

use std::sync::Arc;

use crate::record::LogRecord;
use crate::sink::{build_aggregated_event, deliver_isolated, BulkSink, DeliveryMode};
use crate::stage::Stage;

/// Ordered, append-only collection of one request's log records, plus
/// the sinks subscribed to them.
///
/// Eager subscriptions receive every record appended after registration,
/// at append time. Deferred subscriptions receive exactly one aggregated
/// event at [`flush`](RecordBuffer::flush), and nothing for a request
/// that produced no records. A sink never sees both.
pub struct RecordBuffer {
    records: Vec<LogRecord>,
    sinks: Vec<(Arc<dyn BulkSink>, DeliveryMode)>,
    flushed: bool,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            sinks: Vec::new(),
            flushed: false,
        }
    }

    /// Append a record and deliver it to every eager sink. A failing
    /// sink is reported and skipped; it cannot corrupt the buffer or
    /// block the remaining sinks.
    pub fn append(&mut self, record: LogRecord) {
        self.records.push(record);
        if let Some(record) = self.records.last() {
            deliver_isolated(
                self.sinks
                    .iter()
                    .filter(|(_, mode)| *mode == DeliveryMode::Eager)
                    .map(|(sink, _)| sink),
                record,
            );
        }
    }

    /// Subscribe a sink. Eager sinks see records appended from now on;
    /// deferred sinks see one aggregated event at flush.
    pub fn register_sink(&mut self, sink: Arc<dyn BulkSink>, mode: DeliveryMode) {
        self.sinks.push((sink, mode));
    }

    /// Deliver the aggregated event to every deferred sink. Called once,
    /// at request finish; a second call is a no-op reported as a
    /// programming error. An empty buffer delivers nothing.
    pub fn flush(&mut self, status_code: u16, stages: &[Stage], method: &str, uri: &str) {
        if self.flushed {
            tracing::error!(
                method,
                uri,
                "request buffer flushed more than once; ignoring"
            );
            return;
        }
        self.flushed = true;

        let event = match build_aggregated_event(&self.records, stages, status_code, method, uri)
        {
            Some(event) => event,
            None => return,
        };

        for (sink, mode) in &self.sinks {
            if *mode != DeliveryMode::Deferred {
                continue;
            }
            if let Err(err) = sink.deliver_bulk(event.clone()) {
                tracing::warn!(sink = sink.name(), error = %err, "bulk sink delivery failed");
            }
        }
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for RecordBuffer {
    fn default() -> Self {
        Self::new()
    }
}

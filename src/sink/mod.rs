//! Sink delivery surface.
//!
//! A sink consumes a request's log output in one of two modes: eager
//! (every record individually, as produced) or deferred (one aggregated
//! summary event per request, at completion). Transport and encoding of
//! events to any external service are the sink implementation's concern.

mod aggregate;
mod builtin;
mod factory;
mod registry;

pub use aggregate::{build_aggregated_event, AggregatedEvent};
pub use builtin::{ChannelSink, Delivery, DisabledSink, MemorySink, TracingSink};
pub use factory::aggregator_sink_from_config;
pub use registry::SharedSinks;

use thiserror::Error;

use crate::record::LogRecord;

/// How a registered sink consumes a request's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Every record individually, at append time.
    Eager,
    /// One aggregated event, at finish.
    Deferred,
}

/// Errors produced by sink registration and delivery.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink delivery failed: {0}")]
    Delivery(String),
    #[error("missing or invalid sink configuration: {0}")]
    MissingConfiguration(String),
    #[error("sink delivery queue is full")]
    QueueFull,
}

/// The contract a downstream consumer implements.
///
/// A sink only needs to override the operation matching the mode it is
/// registered with; the other defaults to a no-op. Implementations must
/// not block the request path indefinitely in `deliver` — bounded or
/// background delivery is the sink's responsibility.
pub trait BulkSink: Send + Sync {
    /// Short identifier used in delivery-failure diagnostics.
    fn name(&self) -> &str;

    /// Eager delivery: called once per record as it is appended.
    fn deliver(&self, _record: &LogRecord) -> Result<(), SinkError> {
        Ok(())
    }

    /// Deferred delivery: called exactly once per request at finish,
    /// never with an empty buffer.
    fn deliver_bulk(&self, _event: AggregatedEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Deliver a record to each sink in turn, isolating failures: a failing
/// sink is reported through the process-wide logging path and skipped,
/// never preventing delivery to the remaining sinks.
pub(crate) fn deliver_isolated<'a, I>(sinks: I, record: &LogRecord)
where
    I: IntoIterator<Item = &'a std::sync::Arc<dyn BulkSink>>,
{
    for sink in sinks {
        if let Err(err) = sink.deliver(record) {
            tracing::warn!(sink = sink.name(), error = %err, "sink delivery failed");
        }
    }
}

//! Built-in sink implementations.

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::{AggregatedEvent, BulkSink, SinkError};
use crate::record::{LogRecord, Severity};

/// Eager sink bridging each record to the process-wide `tracing` stream
/// at its own severity. Record names arrive already decorated with the
/// request correlation identifier, so the shared stream stays
/// request-correlatable.
#[derive(Debug, Default)]
pub struct TracingSink;

impl BulkSink for TracingSink {
    fn name(&self) -> &str {
        "tracing"
    }

    fn deliver(&self, record: &LogRecord) -> Result<(), SinkError> {
        let name = record.name.as_str();
        let message = record.message.as_str();
        match record.level {
            Severity::Debug => tracing::debug!(source = name, "{}", message),
            Severity::Info => tracing::info!(source = name, "{}", message),
            Severity::Warning => tracing::warn!(source = name, "{}", message),
            Severity::Error => tracing::error!(source = name, "{}", message),
            Severity::Critical => tracing::error!(source = name, critical = true, "{}", message),
        }
        Ok(())
    }
}

/// Captures everything it is handed. Test double and simplest consumer.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
    events: Mutex<Vec<AggregatedEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn events(&self) -> Vec<AggregatedEvent> {
        self.events.lock().clone()
    }
}

impl BulkSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn deliver(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn deliver_bulk(&self, event: AggregatedEvent) -> Result<(), SinkError> {
        self.events.lock().push(event);
        Ok(())
    }
}

/// Payload forwarded by a [`ChannelSink`] to its transport task.
#[derive(Debug, Clone)]
pub enum Delivery {
    Record(LogRecord),
    Bulk(AggregatedEvent),
}

/// Forwards deliveries over a bounded channel so the request path never
/// blocks on transport. A full queue fails the delivery with
/// [`SinkError::QueueFull`]; dispatch reports and drops it.
#[derive(Debug)]
pub struct ChannelSink {
    name: String,
    tx: mpsc::Sender<Delivery>,
}

impl ChannelSink {
    /// Create a sink with the given queue capacity, returning the
    /// receiving half for the transport task.
    pub fn bounded(name: impl Into<String>, capacity: usize) -> (Self, mpsc::Receiver<Delivery>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                name: name.into(),
                tx,
            },
            rx,
        )
    }

    fn send(&self, delivery: Delivery) -> Result<(), SinkError> {
        self.tx.try_send(delivery).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => SinkError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => {
                SinkError::Delivery("delivery channel closed".to_string())
            }
        })
    }
}

impl BulkSink for ChannelSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn deliver(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.send(Delivery::Record(record.clone()))
    }

    fn deliver_bulk(&self, event: AggregatedEvent) -> Result<(), SinkError> {
        self.send(Delivery::Bulk(event))
    }
}

/// No-op sink returned by the factory when the aggregation capability is
/// not configured. Decided once at startup so call sites never branch on
/// availability.
#[derive(Debug, Default)]
pub struct DisabledSink;

impl BulkSink for DisabledSink {
    fn name(&self) -> &str {
        "disabled"
    }
}

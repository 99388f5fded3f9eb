//! Capability-checked sink construction.
//!
//! Whether the aggregation sink exists is decided once, at startup, from
//! configuration: an unset endpoint yields a no-op [`DisabledSink`] so
//! call sites never branch on availability, while a present but invalid
//! endpoint fails fast instead of silently disabling delivery.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{BulkSink, ChannelSink, Delivery, DisabledSink, SinkError};
use crate::config::SinkConfig;

/// Build the aggregation sink from configuration.
///
/// Returns the sink together with the receiving half of its delivery
/// channel when the capability is enabled; the receiver is `None` for
/// the disabled variant. Transporting deliveries off the receiver to any
/// external service is the host's concern.
pub fn aggregator_sink_from_config(
    config: &SinkConfig,
) -> Result<(Arc<dyn BulkSink>, Option<mpsc::Receiver<Delivery>>), SinkError> {
    let addr = match &config.aggregator_addr {
        Some(addr) => addr.as_str(),
        None => return Ok((Arc::new(DisabledSink), None)),
    };

    validate_addr(addr)?;
    if config.queue_capacity == 0 {
        return Err(SinkError::MissingConfiguration(
            "aggregator queue capacity must be greater than zero".to_string(),
        ));
    }

    let (sink, rx) = ChannelSink::bounded("aggregator", config.queue_capacity);
    Ok((Arc::new(sink), Some(rx)))
}

fn validate_addr(addr: &str) -> Result<(), SinkError> {
    let (host, port) = addr.rsplit_once(':').ok_or_else(|| {
        SinkError::MissingConfiguration(format!(
            "aggregator address {:?} is not host:port",
            addr
        ))
    })?;

    if host.is_empty() {
        return Err(SinkError::MissingConfiguration(format!(
            "aggregator address {:?} has an empty host",
            addr
        )));
    }

    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(SinkError::MissingConfiguration(format!(
            "aggregator address {:?} has an invalid port",
            addr
        ))),
        Ok(_) => Ok(()),
    }
}

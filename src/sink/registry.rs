//! Process-wide sink registry.
//!
//! One explicit registry value per process, created at startup and
//! injected into request-scoped components. Replaces lookup of shared
//! sinks by implicit global name.

use std::sync::Arc;

use parking_lot::RwLock;

use super::{deliver_isolated, BulkSink};
use crate::record::LogRecord;

/// Shared set of process-wide sinks.
///
/// Every request forwards each of its records here in addition to its
/// own buffer. Concurrent forwarding from many requests is expected;
/// ordering is only guaranteed within a single request's own buffer.
#[derive(Clone, Default)]
pub struct SharedSinks {
    sinks: Arc<RwLock<Vec<Arc<dyn BulkSink>>>>,
}

impl SharedSinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a process-wide sink. Records produced after registration
    /// reach it; earlier records do not.
    pub fn register(&self, sink: Arc<dyn BulkSink>) {
        self.sinks.write().push(sink);
    }

    /// Forward one record to every registered sink, isolating per-sink
    /// failures.
    pub fn forward(&self, record: &LogRecord) {
        let sinks = self.sinks.read();
        deliver_isolated(sinks.iter(), record);
    }

    /// Drop all registered sinks. Called at process shutdown.
    pub fn shutdown(&self) {
        self.sinks.write().clear();
    }

    pub fn len(&self) -> usize {
        self.sinks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.read().is_empty()
    }
}

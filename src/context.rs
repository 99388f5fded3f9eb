//! Request correlation context.

use std::time::Instant;

use uuid::Uuid;

/// Immutable per-request identity: correlation token and monotonic start
/// instant. Created when a request begins and discarded when it finishes.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub start_time: Instant,
}

impl RequestContext {
    /// Bind an externally supplied request identifier, starting the
    /// monotonic clock now.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            start_time: Instant::now(),
        }
    }

    /// Generate a fresh correlation identifier for hosts that do not
    /// supply one.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}

/// Decorates every outgoing record's logical source name with the
/// request correlation identifier, so a centralized log stream remains
/// request-correlatable even without per-request buffering.
#[derive(Debug, Clone)]
pub struct ContextFilter {
    request_id: String,
}

impl ContextFilter {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    /// Join the logical name and the request id with `.`, skipping empty
    /// components.
    pub fn decorate(&self, name: &str) -> String {
        [name, self.request_id.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(".")
    }
}

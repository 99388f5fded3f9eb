//! reqlog — per-request log aggregation and staged-latency
//! instrumentation.
//!
//! For every inbound request the host creates a [`RequestLogger`] that
//! collects all log records emitted during the request, tracks named
//! timing checkpoints ("stages"), and at completion delivers the
//! records and timing breakdown to downstream sinks — either eagerly,
//! record by record, or as one aggregated summary event.
//!
//! # Data Flow
//!
//! ```text
//! request start ──> RequestLogger::new(context, shared_sinks)
//!   leveled calls ──> record (correlation-decorated)
//!                       ├──> process-wide SharedSinks
//!                       └──> RecordBuffer ──> eager BulkSinks
//!   stage_tag() ────> StageTracker + debug record
//! request end ────> finish(status, method, uri)
//!                       └──> AggregatedEvent ──> deferred BulkSinks
//! ```
//!
//! # Boundaries
//!
//! Sink transport and encoding are the sink implementation's concern;
//! the core performs no network I/O and the only blocking on the
//! request path is sink delivery, which sinks are required to bound
//! (see [`sink::ChannelSink`]). Sink failures degrade observability,
//! never request handling.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use reqlog::{MemorySink, RequestContext, RequestLogger, SharedSinks};
//!
//! let shared = SharedSinks::new();
//! let summary = Arc::new(MemorySink::new());
//!
//! let mut log = RequestLogger::new(RequestContext::new("req-42"), shared);
//! log.add_bulk_handler(summary.clone(), false);
//! log.register_handler("UsersPage");
//!
//! log.info("loading user");
//! log.stage_tag("db");
//! log.log_stages(200);
//! log.finish(200, "GET", "/users/42");
//!
//! assert_eq!(summary.events().len(), 1);
//! ```

pub mod buffer;
pub mod config;
pub mod context;
pub mod logging;
pub mod record;
pub mod request;
pub mod sink;
pub mod stage;

pub use buffer::RecordBuffer;
pub use config::{load_env_config, EnvConfig, SinkConfig};
pub use context::{ContextFilter, RequestContext};
pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use record::{ErrorInfo, LogRecord, Severity};
pub use request::{stage_summary, RequestLogger};
pub use sink::{
    aggregator_sink_from_config, AggregatedEvent, BulkSink, ChannelSink, DeliveryMode,
    DisabledSink, MemorySink, SharedSinks, SinkError, TracingSink,
};
pub use stage::{Stage, StageTracker};

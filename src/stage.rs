//! Staged-latency checkpoint tracking.
//!
//! A [`StageTracker`] records an ordered sequence of named timing
//! checkpoints relative to request start. Timing uses the monotonic
//! clock exclusively so wall-clock adjustments cannot corrupt deltas.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// One named timing checkpoint.
///
/// `delta` is the elapsed time since the previous checkpoint (or request
/// start for the first one); `start_delta` is the elapsed time from
/// request start to the beginning of this stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub delta: Duration,
    pub start_delta: Duration,
}

impl Stage {
    /// Stage duration in fractional milliseconds, for human-readable
    /// timing lines.
    pub fn delta_ms(&self) -> f64 {
        self.delta.as_secs_f64() * 1000.0
    }

    /// Stage duration in whole milliseconds, truncated. This is the
    /// value delivered to sinks.
    pub fn delta_millis(&self) -> u64 {
        self.delta.as_millis() as u64
    }
}

/// Records checkpoints for one request.
///
/// Stage names need not be unique; duplicates are recorded
/// independently and ordering is the only correlation key.
#[derive(Debug)]
pub struct StageTracker {
    start_time: Instant,
    last_stage_time: Instant,
    stages: Vec<Stage>,
}

impl StageTracker {
    /// Start tracking from the given request start instant.
    pub fn new(start_time: Instant) -> Self {
        Self {
            start_time,
            last_stage_time: start_time,
            stages: Vec::new(),
        }
    }

    /// Record a checkpoint and return the stage just recorded.
    pub fn stage_tag(&mut self, name: impl Into<String>) -> Stage {
        let now = Instant::now();
        let stage = Stage {
            name: name.into(),
            delta: now - self.last_stage_time,
            start_delta: self.last_stage_time - self.start_time,
        };
        self.last_stage_time = now;
        self.stages.push(stage.clone());
        stage
    }

    /// Sum of all recorded stage deltas.
    pub fn total(&self) -> Duration {
        self.stages.iter().map(|s| s.delta).sum()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn start_time(&self) -> Instant {
        self.start_time
    }
}

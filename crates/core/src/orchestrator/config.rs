//! Orchestrator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the workflow orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Pause before each automatic step (milliseconds).
    /// Purely pacing so a UI can show the item as processing; 0 disables it.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Upper bound for a single external step call (milliseconds).
    /// An overrun is treated as a step failure. 0 disables the limit.
    #[serde(default = "default_step_timeout")]
    pub step_timeout_ms: u64,

    /// Capacity of the event broadcast channel.
    /// Slow subscribers that fall further behind miss events.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_settle_delay() -> u64 {
    500
}

fn default_step_timeout() -> u64 {
    30_000 // 30 seconds
}

fn default_event_buffer() -> usize {
    256
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay(),
            step_timeout_ms: default_step_timeout(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl OrchestratorConfig {
    /// Configuration with no pacing delay, for tests.
    pub fn immediate() -> Self {
        Self {
            settle_delay_ms: 0,
            ..Default::default()
        }
    }

    pub fn settle_delay(&self) -> Option<Duration> {
        (self.settle_delay_ms > 0).then(|| Duration::from_millis(self.settle_delay_ms))
    }

    pub fn step_timeout(&self) -> Option<Duration> {
        (self.step_timeout_ms > 0).then(|| Duration::from_millis(self.step_timeout_ms))
    }
}

//! Streaming and reconnection settings.

use std::time::Duration;

use serde::Deserialize;

/// Reconnection backoff for streaming upstreams.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReconnectionConfig {
    /// Initial delay before first reconnection attempt (milliseconds).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Maximum delay between reconnection attempts (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier applied to delay after each failed attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Consecutive failures after which the stream is failed permanently.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    60000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_consecutive_failures() -> u32 {
    10
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

/// Per-pair stream settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamConfig {
    /// Levels per side in published books.
    #[serde(default = "default_depth")]
    pub depth: usize,
    /// Events buffered per subscriber before it starts lagging.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Deltas held while a snapshot is outstanding.
    #[serde(default = "default_max_buffered_deltas")]
    pub max_buffered_deltas: usize,
    /// Timeout for one REST snapshot request (milliseconds).
    #[serde(default = "default_snapshot_timeout_ms")]
    pub snapshot_timeout_ms: u64,
    #[serde(default)]
    pub reconnection: ReconnectionConfig,
}

const fn default_depth() -> usize {
    50
}

const fn default_channel_capacity() -> usize {
    1024
}

const fn default_max_buffered_deltas() -> usize {
    10_000
}

const fn default_snapshot_timeout_ms() -> u64 {
    10_000
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            channel_capacity: default_channel_capacity(),
            max_buffered_deltas: default_max_buffered_deltas(),
            snapshot_timeout_ms: default_snapshot_timeout_ms(),
            reconnection: ReconnectionConfig::default(),
        }
    }
}

impl StreamConfig {
    #[must_use]
    pub fn snapshot_timeout(&self) -> Duration {
        Duration::from_millis(self.snapshot_timeout_ms)
    }
}

//! Reconnection backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::infrastructure::config::stream::ReconnectionConfig;

/// Exponential backoff over consecutive transport failures.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: ReconnectionConfig,
    current_delay_ms: u64,
    failures: u32,
}

impl Backoff {
    #[must_use]
    pub fn new(config: ReconnectionConfig) -> Self {
        let current_delay_ms = config.initial_delay_ms;
        Self {
            config,
            current_delay_ms,
            failures: 0,
        }
    }

    /// Consecutive failures since the last [`reset`](Self::reset).
    #[must_use]
    pub const fn failures(&self) -> u32 {
        self.failures
    }

    /// Record a failure. Returns the delay before the next attempt, or `None`
    /// once `max_consecutive_failures` is reached.
    pub fn record_failure(&mut self) -> Option<Duration> {
        self.failures += 1;
        if self.failures >= self.config.max_consecutive_failures {
            return None;
        }
        Some(self.next_delay())
    }

    /// A session synced successfully; start over from the initial delay.
    pub fn reset(&mut self) {
        self.failures = 0;
        self.current_delay_ms = self.config.initial_delay_ms;
    }

    fn next_delay(&mut self) -> Duration {
        let base_delay = Duration::from_millis(self.current_delay_ms);
        let delay = base_delay + Duration::from_millis(Self::jitter_ms(base_delay));

        let next_delay = (self.current_delay_ms as f64 * self.config.backoff_multiplier) as u64;
        self.current_delay_ms = next_delay.min(self.config.max_delay_ms);

        delay
    }

    /// Up to 20% of the base delay.
    fn jitter_ms(base_delay: Duration) -> u64 {
        let jitter_range_ms = (base_delay.as_millis() as u64) / 5;
        if jitter_range_ms == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..=jitter_range_ms)
    }
}

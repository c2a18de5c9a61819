//! Exponential backoff shared by the readiness poll and the API client.

use std::time::Duration;

use rand::Rng;

use super::config::BackoffConfig;

/// Stateful delay sequence: `initial`, `initial * m`, `initial * m^2`, ...
/// capped at `max_delay_ms`.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: BackoffConfig,
    current_delay_ms: u64,
}

impl Backoff {
    #[must_use]
    pub fn new(config: BackoffConfig) -> Self {
        let current_delay_ms = config.initial_delay_ms.min(config.max_delay_ms);
        Self {
            config,
            current_delay_ms,
        }
    }

    /// Restart the sequence after a success.
    pub fn reset(&mut self) {
        self.current_delay_ms = self.config.initial_delay_ms.min(self.config.max_delay_ms);
    }

    /// Return the current delay and advance to the next one.
    ///
    /// Jitter adds up to 20% but never pushes a delay past the cap.
    pub fn next_delay(&mut self) -> Duration {
        let base = self.current_delay_ms;
        let jitter = if self.config.jitter { jitter_ms(base) } else { 0 };
        let delay = base.saturating_add(jitter).min(self.config.max_delay_ms);

        let next = (self.current_delay_ms as f64 * self.config.backoff_multiplier) as u64;
        self.current_delay_ms = next.min(self.config.max_delay_ms);

        Duration::from_millis(delay)
    }
}

fn jitter_ms(base_ms: u64) -> u64 {
    let range = base_ms / 5;
    if range == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..=range)
}

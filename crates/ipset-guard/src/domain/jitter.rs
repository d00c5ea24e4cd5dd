//! Randomized backoff delays
//!
//! Concurrent writers that lose the same race back off for different
//! durations so they do not collide again on the next attempt.

use rand::Rng;
use std::time::Duration;

use super::config::RetryConfig;

/// Source of backoff delays between conflicting attempts
pub trait BackoffJitter: Send + Sync {
    /// Delay before the next attempt
    fn next_delay(&self) -> Duration;
}

/// Uniform delay in `[min, max]` milliseconds, both ends inclusive
///
/// Draws from the thread-local generator, so a shared instance is safe to
/// use from any number of tasks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformJitter {
    min_ms: u64,
    max_ms: u64,
}

impl UniformJitter {
    /// Swaps the bounds if they are given in the wrong order
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.backoff_min_ms, config.backoff_max_ms)
    }
}

impl Default for UniformJitter {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl BackoffJitter for UniformJitter {
    fn next_delay(&self) -> Duration {
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }
}

/// Always the same delay; for deterministic tests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedJitter(pub Duration);

impl FixedJitter {
    pub fn zero() -> Self {
        Self(Duration::ZERO)
    }
}

impl BackoffJitter for FixedJitter {
    fn next_delay(&self) -> Duration {
        self.0
    }
}

//! # Sync Configuration
//!
//! Configuration for the sync engine: bootstrap backoff and the policy for
//! failed reductions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{DEFAULT_RETRY_FACTOR, DEFAULT_RETRY_INITIAL_MS};

/// Exponential backoff for the bootstrap handshake.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// Delay before the first re-attempt, in milliseconds.
    pub initial_delay_ms: u64,

    /// Multiplier applied to the delay on every further re-attempt.
    pub factor: u32,

    /// Upper bound on a single delay. `None` lets it grow unbounded.
    pub max_delay_ms: Option<u64>,

    /// Give up after this many failed attempts. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_RETRY_INITIAL_MS,
            factor: DEFAULT_RETRY_FACTOR,
            max_delay_ms: None,
            max_attempts: None,
        }
    }
}

impl BackoffPolicy {
    /// Delay to wait after the `retry`-th failure (0-based):
    /// `initial * factor^retry`, saturating, clamped to `max_delay_ms`.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let multiplier = u64::from(self.factor).saturating_pow(retry);
        let mut delay_ms = self.initial_delay_ms.saturating_mul(multiplier);
        if let Some(max) = self.max_delay_ms {
            delay_ms = delay_ms.min(max);
        }
        Duration::from_millis(delay_ms)
    }

    /// Has `attempts` reached the cap?
    #[must_use]
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// What the store does when a steady-state reduction fails
/// (the `totalSupply` re-query errors out).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchFailurePolicy {
    /// Log the failure, keep the previous snapshot, continue with the next event.
    #[default]
    SkipEvent,
    /// Stop the engine and surface the error.
    Halt,
}

/// Sync engine configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Bootstrap retry policy.
    pub backoff: BackoffPolicy,

    /// Steady-state failure policy.
    pub on_fetch_failure: FetchFailurePolicy,
}

impl SyncConfig {
    /// Create a config for testing (millisecond backoff, bounded attempts).
    pub fn for_testing() -> Self {
        Self {
            backoff: BackoffPolicy {
                initial_delay_ms: 1,
                factor: 2,
                max_delay_ms: Some(10),
                max_attempts: Some(10),
            },
            on_fetch_failure: FetchFailurePolicy::SkipEvent,
        }
    }
}

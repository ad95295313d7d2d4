//! # Retry Scheduler
//!
//! Drives a fallible async operation until it succeeds, sleeping
//! `initial * factor^n` between attempts.
//!
//! ```text
//! attempt 0 ──fail──▶ sleep 1s ──▶ attempt 1 ──fail──▶ sleep 5s ──▶ attempt 2 ...
//! ```
//!
//! The operation reports failure by returning `Err`; it never has to
//! remember to ask for a retry.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::BackoffPolicy;
use crate::domain::SyncError;

/// Called before every backoff sleep with (failed attempt number, delay).
pub type RetryHook = Arc<dyn Fn(u32, Duration) + Send + Sync>;

/// Exponential-backoff retry loop.
#[derive(Clone)]
pub struct RetryScheduler {
    policy: BackoffPolicy,
    hook: Option<RetryHook>,
}

impl RetryScheduler {
    /// Create a scheduler with the given policy.
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy, hook: None }
    }

    /// Observe every retry (metrics, tests).
    #[must_use]
    pub fn with_hook(mut self, hook: RetryHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// The active policy.
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Run `operation` until it returns `Ok`.
    ///
    /// `operation` receives the 0-based attempt number. Only returns `Err`
    /// when the policy has an attempt cap and it is reached.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, SyncError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 0u32;
        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(attempts = attempt + 1, "[nft-sync] Operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    let failures = attempt.saturating_add(1);
                    if self.policy.exhausted(failures) {
                        error!(attempts = failures, error = %e, "[nft-sync] Giving up");
                        return Err(SyncError::RetryExhausted { attempts: failures });
                    }

                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        attempt = failures,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "[nft-sync] Retrying in {:.1}s",
                        delay.as_secs_f64()
                    );
                    if let Some(hook) = &self.hook {
                        hook(failures, delay);
                    }

                    tokio::time::sleep(delay).await;
                    attempt = failures;
                }
            }
        }
    }
}

//! Bounded retry policy for boundary-layer probes.
//!
//! Used for polling the FPL auth-check endpoint after login. The policy is
//! plain data so it can come from config and be swapped in tests.

use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Max attempts plus an exponential backoff schedule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    pub initial_interval_ms: u64,
    /// Factor applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_interval_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_interval_ms: 1000,
            backoff_multiplier: 2.0,
            max_interval_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// A policy with no waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_interval_ms: 0,
            backoff_multiplier: 1.0,
            max_interval_ms: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait before attempt number `attempt` (0-based).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = self.backoff_multiplier.max(1.0).powi(attempt as i32 - 1);
        let ms = (self.initial_interval_ms as f64 * factor).min(self.max_interval_ms as f64);
        Duration::from_millis(ms.max(0.0) as u64)
    }

    /// Run `probe` until it yields `Some`, or attempts run out.
    ///
    /// `probe` returning `Ok(None)` means "not ready yet"; an `Err` aborts
    /// immediately. Returns `Ok(None)` when every attempt came back empty.
    pub async fn poll<T, F, Fut>(&self, label: &str, mut probe: F) -> anyhow::Result<Option<T>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = anyhow::Result<Option<T>>>,
    {
        for attempt in 0..self.attempts() {
            let delay = self.delay_before(attempt);
            if !delay.is_zero() {
                debug!(label, attempt, delay_ms = delay.as_millis() as u64, "Waiting before retry");
                tokio::time::sleep(delay).await;
            }
            if let Some(value) = probe(attempt).await? {
                debug!(label, attempt, "Probe succeeded");
                return Ok(Some(value));
            }
        }
        debug!(label, attempts = self.attempts(), "Probe attempts exhausted");
        Ok(None)
    }
}

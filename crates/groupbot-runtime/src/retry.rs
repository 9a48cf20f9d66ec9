//! Retry policy with decorrelated-jitter backoff.
//!
//! Wraps the transient external calls (announcement posts, sweep
//! deliveries) with a small fixed attempt budget and exponentially growing,
//! jittered delays so simultaneous retries against the same endpoint spread
//! out instead of herding.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Passed-in retry configuration. Tests substitute `zero_delay` to run the
/// full attempt budget without sleeping.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = single attempt, no retry).
    pub max_attempts: u32,
    /// Starting delay; also the lower bound of every jittered draw.
    pub base_delay: Duration,
    /// Cap on the jittered delay growth.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Policy that retries `max_attempts` times with no sleeping.
    pub fn zero_delay(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Execute `op`, retrying on `Err` until the attempt budget is spent.
    /// Returns the last error when every attempt fails.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut prev_delay = self.base_delay;
        let mut attempt = 0u32;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts => {
                    attempt += 1;
                    let delay = self.next_delay(prev_delay);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "transient failure, retrying: {err}"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    prev_delay = delay.max(self.base_delay);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Decorrelated jitter: uniform draw between the base delay and three
    /// times the previous delay, capped.
    fn next_delay(&self, prev: Duration) -> Duration {
        if self.max_delay.is_zero() {
            return Duration::ZERO;
        }
        let low = self.base_delay.as_millis() as u64;
        let high = (prev.as_millis() as u64).saturating_mul(3).max(low + 1);
        let drawn = rand::thread_rng().gen_range(low..high);
        Duration::from_millis(drawn).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let policy = RetryPolicy::zero_delay(2);
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: Result<u32, String> = policy
            .run(|| {
                let c = c.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err("flaky".to_string())
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_budget_returns_last_error() {
        let policy = RetryPolicy::zero_delay(2);
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: Result<(), String> = policy
            .run(|| {
                let n = c.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("failure {n}")) }
            })
            .await;

        assert_eq!(result.unwrap_err(), "failure 2");
        // 1 initial attempt + 2 retries.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_attempts_means_single_try() {
        let policy = RetryPolicy::zero_delay(0);
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: Result<(), String> = policy
            .run(|| {
                c.fetch_add(1, Ordering::SeqCst);
                async { Err("nope".to_string()) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn jittered_delay_stays_within_bounds() {
        let policy = RetryPolicy::new(
            2,
            Duration::from_millis(100),
            Duration::from_millis(2000),
        );
        let mut prev = policy.base_delay;
        for _ in 0..50 {
            let delay = policy.next_delay(prev);
            assert!(delay >= Duration::ZERO);
            assert!(delay <= policy.max_delay);
            prev = delay.max(policy.base_delay);
        }
    }
}

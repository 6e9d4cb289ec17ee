//! Fixed-delay retry used for every outbound validation call.

use log::{error, warn};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first call included. Zero is treated as one.
    pub attempts: u32,
    /// Pause between a failed attempt and the next one.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    fn max_attempts(&self) -> u32 {
        self.attempts.max(1)
    }
}

/// Runs `op` until it succeeds, fails with an error `retry_on` rejects, or
/// the policy's attempts are used up.
///
/// `op` receives the 1-based attempt number. Every failure is logged; the
/// last error is returned.
pub async fn with_retry<T, E, R, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    retry_on: R,
    mut op: F,
) -> Result<T, E>
where
    R: Fn(&E) -> bool,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.max_attempts();
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                error!("{} failed (attempt {}/{}): {}", label, attempt, attempts, err);
                if attempt >= attempts || !retry_on(&err) {
                    return Err(err);
                }
                warn!(
                    "Retrying {} ({}/{}) after {}ms...",
                    label,
                    attempt,
                    attempts,
                    policy.delay.as_millis()
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn always<E>(_: &E) -> bool {
        true
    }

    fn quick(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(1))
    }

    #[test]
    fn default_policy_is_three_attempts_one_second_apart() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay, Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn stops_after_last_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = with_retry(&quick(3), "lookup", always, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("API error: 503 Service Unavailable".to_string()) }
        })
        .await;

        assert_eq!(result.unwrap_err(), "API error: 503 Service Unavailable");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry(&quick(3), "lookup", always, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(format!("attempt {attempt} failed"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_attempts_still_calls_once() {
        let calls = AtomicU32::new(0);
        let _: Result<(), &str> = with_retry(&quick(0), "lookup", always, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("down") }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn waits_between_attempts() {
        let policy = RetryPolicy::new(2, Duration::from_millis(20));
        let started = std::time::Instant::now();
        let _: Result<(), &str> = with_retry(&policy, "lookup", always, |_| async { Err("down") }).await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn rejected_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> =
            with_retry(&quick(3), "lookup", |e: &String| !e.starts_with("fatal"), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("fatal: bad payload".to_string()) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

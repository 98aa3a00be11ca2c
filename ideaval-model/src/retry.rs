//! Retries for OpenRouter calls.
//!
//! Each attempt reports whether its failure is worth another try. Rate limits
//! and gateway errors are transient; a bad request or an unparseable body is
//! not, and neither is anything after the last attempt.

use ideaval_core::{IdeaError, Result};
use std::future::Future;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. Never less than one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// A single attempt.
    #[must_use]
    pub fn none() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    /// `max_attempts` attempts with no wait in between.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self { max_attempts, base_delay: Duration::ZERO, max_delay: Duration::ZERO }
    }

    /// Wait before retry number `retry` (1-based): the base delay doubled per
    /// earlier retry, capped at `max_delay`.
    fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Failure of one attempt.
#[derive(Debug)]
pub enum AttemptError {
    /// Worth retrying; `retry_after` is the wait the provider asked for, if any.
    Transient { error: IdeaError, retry_after: Option<Duration> },
    Fatal(IdeaError),
}

impl AttemptError {
    /// Classify an HTTP error answer from the provider.
    pub fn from_status(status: u16, retry_after: Option<Duration>, error: IdeaError) -> Self {
        if is_transient_status(status) {
            Self::Transient { error, retry_after }
        } else {
            Self::Fatal(error)
        }
    }

    pub fn into_error(self) -> IdeaError {
        match self {
            Self::Transient { error, .. } | Self::Fatal(error) => error,
        }
    }
}

/// Request timeout, rate limit and server-side errors.
#[must_use]
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 408 | 429) || (500..=599).contains(&status)
}

/// Parse a `Retry-After` header given in seconds. HTTP dates are ignored.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Run `attempt` until it succeeds, fails fatally or `policy` runs out. The
/// closure receives the 1-based attempt number.
pub async fn with_retries<T, Op, Fut>(policy: &RetryPolicy, mut attempt: Op) -> Result<T>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<T, AttemptError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut number = 1;

    loop {
        match attempt(number).await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Transient { error, retry_after }) if number < max_attempts => {
                let delay = retry_after.map_or_else(|| policy.backoff(number), |d| d.min(policy.max_delay));
                ideaval_telemetry::warn!(
                    attempt = number,
                    max_attempts,
                    delay_ms = delay.as_millis(),
                    error = %error,
                    "OpenRouter call failed; retrying"
                );
                tokio::time::sleep(delay).await;
                number += 1;
            }
            Err(failure) => return Err(failure.into_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn transient(message: &str) -> AttemptError {
        AttemptError::Transient { error: IdeaError::Model(message.to_string()), retry_after: None }
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let seen = Mutex::new(Vec::new());

        let value = with_retries(&RetryPolicy::immediate(3), |n| {
            seen.lock().unwrap().push(n);
            async move { if n < 3 { Err(transient("503")) } else { Ok("done") } }
        })
        .await
        .unwrap();

        assert_eq!(value, "done");
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fatal_failure_stops_at_once() {
        let calls = Mutex::new(0);

        let err = with_retries(&RetryPolicy::immediate(5), |_| {
            *calls.lock().unwrap() += 1;
            async { Err::<(), _>(AttemptError::Fatal(IdeaError::Model("400".to_string()))) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, IdeaError::Model(m) if m == "400"));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_last_transient_error_is_returned() {
        let err = with_retries(&RetryPolicy::none(), |_| async { Err::<(), _>(transient("429")) })
            .await
            .unwrap_err();
        assert!(matches!(err, IdeaError::Model(m) if m == "429"));
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(3),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_secs(1));
        assert_eq!(policy.backoff(3), Duration::from_secs(2));
        assert_eq!(policy.backoff(4), Duration::from_secs(3));
        assert_eq!(policy.backoff(40), Duration::from_secs(3));
    }

    #[test]
    fn test_status_classification() {
        assert!(is_transient_status(429));
        assert!(is_transient_status(502));
        assert!(is_transient_status(408));
        assert!(!is_transient_status(400));
        assert!(!is_transient_status(401));
    }

    #[test]
    fn test_retry_after_seconds() {
        assert_eq!(parse_retry_after(" 2 "), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2026 07:28:00 GMT"), None);
    }
}

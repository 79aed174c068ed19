//! Retry loop and outcome classification for remote calls.
//!
//! Every operation, whichever call style initiated it, funnels through
//! [`execute_with_retry`]. Classification is kept in pure functions so the
//! policy is testable without network I/O.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{RetryConfig, Result, SkillError};

/// Classified result of a single remote attempt.
#[derive(Debug)]
pub(crate) enum Outcome<T> {
    /// The attempt produced a decoded response.
    Success(T),
    /// Transport failure or server-side (5xx) failure; worth another attempt.
    Retryable(SkillError),
    /// Client-side failure; retrying cannot help.
    NonRetryable(SkillError),
}

/// Whether a non-success HTTP status is worth retrying.
///
/// Only the server-error class (>= 500) qualifies; 4xx means the request
/// itself is at fault, and anything else (including 3xx) is treated the
/// same way.
pub(crate) fn retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
}

/// Backoff delay before attempt `attempt + 1`.
///
/// Grows as `initial_delay * 2^attempt`, clamped at `max_delay`.
pub(crate) fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let multiplier = 1u32 << attempt.min(16);
    config
        .initial_delay()
        .saturating_mul(multiplier)
        .min(config.max_delay())
}

/// Runs `operation` until it succeeds, fails fatally, or consumes every
/// attempt allowed by `config`.
///
/// Attempts within one call are strictly sequential: the next attempt
/// starts only after the previous outcome is classified and the backoff
/// delay has elapsed. Both the attempt itself and the backoff sleep are
/// raced against `cancel`, so client shutdown surfaces
/// [`SkillError::Cancelled`] promptly instead of leaking work.
pub(crate) async fn execute_with_retry<T, F, Fut>(
    config: &RetryConfig,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome<T>>,
{
    let max_retries = config.max_retries();
    for attempt in 0..max_retries {
        tracing::debug!(attempt = attempt + 1, max_retries, "executing api call");

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SkillError::Cancelled),
            outcome = operation() => outcome,
        };

        match outcome {
            Outcome::Success(value) => return Ok(value),
            Outcome::NonRetryable(error) => {
                tracing::warn!(%error, "client error, not retrying");
                return Err(error);
            }
            Outcome::Retryable(error) => {
                tracing::warn!(%error, attempt = attempt + 1, max_retries, "api call failed");
                if attempt + 1 == max_retries {
                    return Err(error);
                }

                let delay = backoff_delay(config, attempt);
                tracing::debug!(delay_ms = delay.as_millis() as u64, "retrying after backoff");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(SkillError::Cancelled),
                    _ = sleep(delay) => {}
                }
            }
        }
    }

    // Unreachable while RetryConfig enforces max_retries > 0; kept as a
    // guard so a policy change cannot silently return nothing.
    Err(SkillError::RetryExhausted {
        attempts: max_retries,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use reqwest::StatusCode;
    use tokio_util::sync::CancellationToken;

    use super::{backoff_delay, execute_with_retry, retryable_status, Outcome};
    use crate::{RetryConfig, SkillError};

    fn config(max_retries: u32, initial_ms: u64, max_ms: u64) -> RetryConfig {
        RetryConfig::new(
            max_retries,
            Duration::from_millis(initial_ms),
            Duration::from_millis(max_ms),
        )
        .expect("test config must be valid")
    }

    fn retryable_error() -> SkillError {
        SkillError::Api {
            status: 503,
            body: "unavailable".to_owned(),
        }
    }

    #[test]
    fn server_errors_are_retryable() {
        assert!(retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(retryable_status(StatusCode::GATEWAY_TIMEOUT));
    }

    #[test]
    fn client_and_redirect_statuses_are_not_retryable() {
        assert!(!retryable_status(StatusCode::BAD_REQUEST));
        assert!(!retryable_status(StatusCode::NOT_FOUND));
        assert!(!retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!retryable_status(StatusCode::FOUND));
    }

    #[test]
    fn backoff_doubles_until_clamped() {
        let config = config(6, 100, 1_000);
        let delays: Vec<u64> = (0..5)
            .map(|attempt| backoff_delay(&config, attempt).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1_000]);
    }

    #[test]
    fn backoff_is_non_decreasing() {
        let config = config(8, 50, 700);
        let mut previous = Duration::ZERO;
        for attempt in 0..8 {
            let delay = backoff_delay(&config, attempt);
            assert!(delay >= previous);
            assert!(delay <= config.max_delay());
            previous = delay;
        }
    }

    #[test]
    fn backoff_with_equal_initial_and_max_stays_flat() {
        let config = config(3, 250, 250);
        assert_eq!(backoff_delay(&config, 0), Duration::from_millis(250));
        assert_eq!(backoff_delay(&config, 2), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn success_on_first_attempt_makes_one_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let counted = calls.clone();

        let result = execute_with_retry(&config(3, 1, 10), &CancellationToken::new(), move || {
            let counted = counted.clone();
            async move {
                counted.fetch_add(1, Ordering::SeqCst);
                Outcome::Success(7u32)
            }
        })
        .await;

        assert_eq!(result.expect("must succeed"), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_retryable_error_stops_after_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counted = calls.clone();

        let result: crate::Result<u32> =
            execute_with_retry(&config(5, 1, 10), &CancellationToken::new(), move || {
                let counted = counted.clone();
                async move {
                    counted.fetch_add(1, Ordering::SeqCst);
                    Outcome::NonRetryable(SkillError::Api {
                        status: 404,
                        body: "missing".to_owned(),
                    })
                }
            })
            .await;

        match result.expect_err("must fail") {
            SkillError::Api { status, .. } => assert_eq!(status, 404),
            other => panic!("expected api error, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retryable_errors_consume_every_attempt_and_surface_the_last() {
        let calls = Arc::new(AtomicU32::new(0));
        let counted = calls.clone();

        let result: crate::Result<u32> =
            execute_with_retry(&config(3, 1, 10), &CancellationToken::new(), move || {
                let counted = counted.clone();
                async move {
                    let call = counted.fetch_add(1, Ordering::SeqCst);
                    Outcome::Retryable(SkillError::Api {
                        status: 500,
                        body: format!("boom {call}"),
                    })
                }
            })
            .await;

        match result.expect_err("must fail") {
            SkillError::Api { status, body } => {
                assert_eq!(status, 500);
                // The surfaced error is the last attempt's, not the first.
                assert_eq!(body, "boom 2");
            }
            other => panic!("expected api error, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counted = calls.clone();

        let result = execute_with_retry(&config(3, 1, 10), &CancellationToken::new(), move || {
            let counted = counted.clone();
            async move {
                if counted.fetch_add(1, Ordering::SeqCst) < 2 {
                    Outcome::Retryable(retryable_error())
                } else {
                    Outcome::Success("ok")
                }
            }
        })
        .await;

        assert_eq!(result.expect("must succeed"), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn backoff_delays_elapse_between_attempts() {
        let start = Instant::now();
        let result: crate::Result<u32> =
            execute_with_retry(&config(3, 20, 200), &CancellationToken::new(), || async {
                Outcome::Retryable(retryable_error())
            })
            .await;

        assert!(result.is_err());
        // Two backoff sleeps: 20ms then 40ms. No delay after the last attempt.
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn cancellation_interrupts_backoff_sleep() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let result: crate::Result<u32> =
            execute_with_retry(&config(3, 10_000, 60_000), &cancel, || async {
                Outcome::Retryable(retryable_error())
            })
            .await;

        match result.expect_err("must be cancelled") {
            SkillError::Cancelled => {}
            other => panic!("expected cancellation, got {other:?}"),
        }
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn pre_cancelled_token_fails_without_calling_operation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = Arc::new(AtomicU32::new(0));
        let counted = calls.clone();

        let result: crate::Result<u32> = execute_with_retry(&config(3, 1, 10), &cancel, move || {
            let counted = counted.clone();
            async move {
                counted.fetch_add(1, Ordering::SeqCst);
                Outcome::Success(1)
            }
        })
        .await;

        assert!(matches!(
            result.expect_err("must be cancelled"),
            SkillError::Cancelled
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

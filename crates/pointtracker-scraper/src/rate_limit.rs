//! Retry with linear backoff for transient network failures.
//!
//! Only failures below the HTTP layer (timeouts, refused or reset
//! connections, DNS, a body cut short) are retried. A response with a bad
//! status is an answer from the server and fails immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` is a transient network condition worth retrying.
///
/// Retriable: [`ScraperError::Http`] raised for a timeout, a connect failure,
/// a request that never completed, or a truncated body.
///
/// Everything else is final, including [`ScraperError::NotFound`],
/// [`ScraperError::UnexpectedStatus`], and decode errors.
#[must_use]
pub fn is_transient(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
        }
        _ => false,
    }
}

/// Runs `operation` up to `max_attempts` times in total.
///
/// After failed attempt `n` on a transient error, sleeps `n × backoff_ms`
/// milliseconds before the next try. The last error is returned once the
/// attempts are used up. Non-transient errors return immediately.
///
/// | Attempt | Sleep before next attempt (`backoff_ms = 3000`) |
/// |---------|------------------------------------------------|
/// | 1 | 3 s |
/// | 2 | 6 s |
/// | 3 (last of 3) | none, error returned |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    backoff_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_transient(&err) || attempt >= max_attempts {
            return Err(err);
        }

        let delay_ms = backoff_ms.saturating_mul(u64::from(attempt));
        tracing::warn!(
            attempt,
            max_attempts,
            delay_ms,
            error = %err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}

//! Back-off between attempts at a page or feed request.
//!
//! Throttling and gateway responses (429, 500, 502, 503, 504) and
//! connect/timeout failures get another attempt. Every other outcome,
//! including a 404 or a 403, is returned on the first attempt. A server that
//! names its own wait with `Retry-After` gets at least that long.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Statuses that trigger another attempt.
pub(crate) const RETRIABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Longest single wait.
const MAX_DELAY: Duration = Duration::from_secs(60);

/// Doublings stop here; `base * 2^7` already exceeds the cap for the
/// default 600 ms base.
const MAX_DOUBLINGS: u32 = 7;

pub(crate) fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::RetriableStatus { .. } => true,
        FetchError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status()
                    .is_some_and(|s| RETRIABLE_STATUSES.contains(&s.as_u16()))
        }
    }
}

/// Wait before retry number `retry` (1-based): `base_ms * 2^(retry-1)`
/// scaled by `jitter` (expected in `0.75..=1.25`), raised to any
/// server-requested wait, then capped.
pub(crate) fn backoff_delay(
    retry: u32,
    base_ms: u64,
    jitter: f64,
    retry_after: Option<Duration>,
) -> Duration {
    let exp = base_ms.saturating_mul(1u64 << retry.saturating_sub(1).min(MAX_DOUBLINGS));
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = Duration::from_millis((exp as f64 * jitter) as u64);
    jittered.max(retry_after.unwrap_or_default()).min(MAX_DELAY)
}

fn retry_after(err: &FetchError) -> Option<Duration> {
    match err {
        FetchError::RetriableStatus { retry_after, .. } => *retry_after,
        FetchError::Http(_) => None,
    }
}

/// Runs `operation`, allowing up to `max_retries` further attempts on
/// transient errors.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || retry >= max_retries {
            return Err(err);
        }
        retry += 1;
        let jitter = rand::random::<f64>() * 0.5 + 0.75;
        let delay = backoff_delay(retry, backoff_base_ms, jitter, retry_after(&err));
        tracing::warn!(
            retry,
            max_retries,
            status = ?err.status(),
            timeout = matches!(&err, FetchError::Http(e) if e.is_timeout()),
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "transient fetch failure, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

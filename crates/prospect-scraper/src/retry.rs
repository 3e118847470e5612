//! Retry utilities for the device bridge client.
//!
//! Transient bridge conditions (network failures, a busy automation server)
//! are retried with exponential backoff. Everything else is propagated on the
//! first failure.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Whether a bridge call may be sent again after an unclear outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Replay {
    /// Reads and navigation that land in the same state when repeated.
    Safe,
    /// Taps, scrolls and key presses; a timed-out gesture may have run.
    Gesture,
}

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ScraperError::BridgeBusy`]: HTTP 503, the bridge refused the call
///   before executing it.
/// - [`ScraperError::Http`]: network-level failure (connection reset,
///   timeout), only for [`Replay::Safe`] calls.
fn is_retriable(err: &ScraperError, replay: Replay) -> bool {
    match err {
        ScraperError::BridgeBusy { .. } => true,
        ScraperError::Http(_) => replay == Replay::Safe,
        _ => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// The wait before retry `n` (1-based) is `backoff_base_secs * 2^(n-1)`
/// seconds; with `max_retries = 3` the operation runs at most 4 times.
/// Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    replay: Replay,
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err, replay) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient device bridge error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}

//! Fixed-ladder retry for the search operation.

use std::time::Duration;

use tracing::warn;

use super::{ApiFailure, FactsApi};
use crate::state::Fact;

/// Delays between search attempts: first retry after 4s, second after 8s.
pub const SEARCH_RETRY_DELAYS: [Duration; 2] = [Duration::from_secs(4), Duration::from_secs(8)];

/// What: Run a remote search with the bounded retry ladder.
///
/// Inputs:
/// - `api`: Client performing the raw requests
/// - `term`: Search term, re-sent verbatim on every attempt
///
/// Output:
/// - First successful result, or the last failure once the ladder is
///   exhausted (three attempts total).
///
/// Details:
/// - Every failure class retries except [`ApiFailure::Decode`], which
///   surfaces immediately.
/// - This is the sole retry authority; the engine never re-retries.
pub async fn search_with_retry<A: FactsApi>(api: &A, term: &str) -> Result<Vec<Fact>, ApiFailure> {
    let mut attempt = 0usize;
    loop {
        match api.search(term).await {
            Ok(facts) => return Ok(facts),
            Err(failure) => {
                if !failure.is_retryable() || attempt >= SEARCH_RETRY_DELAYS.len() {
                    return Err(failure);
                }
                let delay = SEARCH_RETRY_DELAYS[attempt];
                attempt += 1;
                warn!(
                    attempt,
                    delay_secs = delay.as_secs(),
                    %failure,
                    "[Api] Search failed, retrying after fixed delay"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

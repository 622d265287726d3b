//! Remote facts API client: failure taxonomy, live transport, and retry.

use std::fmt;
use std::future::Future;

use crate::state::Fact;

mod live;
mod retry;

pub use live::LiveApi;
pub use retry::{SEARCH_RETRY_DELAYS, search_with_retry};

/// Default base URL of the public facts API.
pub const DEFAULT_BASE_URL: &str = "https://api.chucknorris.io";

/// Closed set of remote API failures.
///
/// Everything the engine can observe from the network collapses into one
/// of these five cases; persistence is modeled as infallible and has no
/// failure domain of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiFailure {
    /// Transport-level failure: the request did not complete or the body
    /// could not be read.
    InvalidResponse,
    /// HTTP 429.
    RateLimited,
    /// HTTP 503.
    ServerBusy,
    /// A 2xx response whose payload does not match the expected shape.
    /// Never retried: the shape will not change on a repeat request.
    Decode,
    /// Any other non-2xx status.
    Unknown,
}

impl ApiFailure {
    /// Map a non-success HTTP status to its failure class.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            503 => Self::ServerBusy,
            _ => Self::Unknown,
        }
    }

    /// Whether the retry ladder may re-issue the request for this failure.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::Decode)
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidResponse => write!(f, "the facts service could not be reached"),
            Self::RateLimited => write!(f, "the facts service is rate limiting requests"),
            Self::ServerBusy => write!(f, "the facts service is busy"),
            Self::Decode => write!(f, "the facts service returned an unexpected payload"),
            Self::Unknown => write!(f, "the facts service failed unexpectedly"),
        }
    }
}

impl std::error::Error for ApiFailure {}

/// Remote content operations consumed by the engine runtime.
///
/// Each call is an independent request/response effect with no shared
/// connection state. Implementations classify failures into
/// [`ApiFailure`]; retry policy is layered on top by
/// [`search_with_retry`], not by implementations.
pub trait FactsApi: Send + Sync + 'static {
    /// Search facts by free-text term, in remote relevance order.
    fn search(&self, term: &str) -> impl Future<Output = Result<Vec<Fact>, ApiFailure>> + Send;

    /// Fetch one random fact from a category.
    fn random_by_category(
        &self,
        category: &str,
    ) -> impl Future<Output = Result<Fact, ApiFailure>> + Send;

    /// List all known categories.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<String>, ApiFailure>> + Send;
}

//! reqwest-backed implementation of the facts API.

use std::future::Future;

use tracing::{debug, info};

use super::{ApiFailure, FactsApi};
use crate::state::Fact;

/// Shape of the search endpoint's 2xx payload.
#[derive(serde::Deserialize)]
struct SearchResponse {
    result: Vec<Fact>,
}

/// Live client over the public facts API.
///
/// Holds one pooled `reqwest::Client`; every operation is a standalone GET
/// with no session state.
#[derive(Clone)]
pub struct LiveApi {
    http: reqwest::Client,
    base_url: String,
}

impl LiveApi {
    /// Build a client against `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// What: Issue a GET and classify the outcome.
    ///
    /// Inputs:
    /// - `path`: Endpoint path under the base URL
    /// - `query`: Query pairs, may be empty
    ///
    /// Output:
    /// - Raw body text on 2xx; classified [`ApiFailure`] otherwise.
    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, ApiFailure> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|_| ApiFailure::InvalidResponse)?;
        let status = resp.status();
        let body = resp.text().await.map_err(|_| ApiFailure::InvalidResponse)?;
        debug!(%url, status = status.as_u16(), bytes = body.len(), "[Api] Request completed");
        if !status.is_success() {
            return Err(ApiFailure::from_status(status.as_u16()));
        }
        Ok(body)
    }
}

/// Decode a search body into facts.
fn parse_search_body(body: &str) -> Result<Vec<Fact>, ApiFailure> {
    serde_json::from_str::<SearchResponse>(body)
        .map(|r| r.result)
        .map_err(|_| ApiFailure::Decode)
}

/// Decode a single-fact body.
fn parse_fact_body(body: &str) -> Result<Fact, ApiFailure> {
    serde_json::from_str(body).map_err(|_| ApiFailure::Decode)
}

/// Decode a categories body (bare JSON string array).
fn parse_categories_body(body: &str) -> Result<Vec<String>, ApiFailure> {
    serde_json::from_str(body).map_err(|_| ApiFailure::Decode)
}

impl FactsApi for LiveApi {
    fn search(&self, term: &str) -> impl Future<Output = Result<Vec<Fact>, ApiFailure>> + Send {
        let query = term.to_string();
        async move {
            let body = self.get_text("/jokes/search", &[("query", query.as_str())]).await?;
            let facts = parse_search_body(&body)?;
            info!(term = %query, count = facts.len(), "[Api] Search results fetched");
            Ok(facts)
        }
    }

    fn random_by_category(
        &self,
        category: &str,
    ) -> impl Future<Output = Result<Fact, ApiFailure>> + Send {
        let category = category.to_string();
        async move {
            let body = self
                .get_text("/jokes/random", &[("category", category.as_str())])
                .await?;
            parse_fact_body(&body)
        }
    }

    fn list_categories(&self) -> impl Future<Output = Result<Vec<String>, ApiFailure>> + Send {
        async move {
            let body = self.get_text("/jokes/categories", &[]).await?;
            let categories = parse_categories_body(&body)?;
            info!(count = categories.len(), "[Api] Categories fetched");
            Ok(categories)
        }
    }
}

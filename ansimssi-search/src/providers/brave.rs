//! Brave Search: Tier-D low-cost backup with an independent index.
//!
//! Not raced by default; add `brave` to the configured providers to
//! spend its quota on every search.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::ProviderAdapter;
use crate::types::{ProviderKind, ProviderOutcome};

use super::normalize_result;

#[derive(Debug, Default, Deserialize)]
struct BraveResponse {
    web: Option<BraveWeb>,
}

#[derive(Debug, Default, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
}

/// Brave Search API adapter.
#[derive(Debug, Clone)]
pub struct BraveAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    count: usize,
}

impl BraveAdapter {
    /// Create an adapter using `config` for timeout and result count.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(config.provider_timeout())?,
            api_key: api_key.to_owned(),
            base_url: "https://api.search.brave.com".into(),
            count: config.results_per_provider,
        })
    }

    /// Point the adapter at a different base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_owned();
        self
    }
}

#[async_trait]
impl ProviderAdapter for BraveAdapter {
    async fn search(&self, query: &str) -> Result<ProviderOutcome, SearchError> {
        tracing::trace!(query, "Brave search");

        let count = self.count.to_string();
        let response = self
            .client
            .get(http::endpoint(&self.base_url, "/res/v1/web/search"))
            .query(&[("q", query), ("count", count.as_str())])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Brave request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Brave HTTP error: {e}")))?;

        let body: BraveResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("Brave response decode failed: {e}")))?;

        Ok(into_outcome(body))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Brave
    }
}

fn into_outcome(body: BraveResponse) -> ProviderOutcome {
    let results = body
        .web
        .unwrap_or_default()
        .results
        .into_iter()
        .filter_map(|r| normalize_result(r.title, r.url, r.description, "Brave Result"))
        .collect();
    ProviderOutcome {
        engine: ProviderKind::Brave,
        results,
        images: vec![],
    }
}

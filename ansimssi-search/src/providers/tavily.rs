//! Tavily: Tier-B AI-curated web search with image results.
//!
//! Tavily is the only provider that returns images alongside results. Its
//! image list holds either bare URLs or `{url, description}` objects,
//! depending on account settings; both shapes are accepted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::ProviderAdapter;
use crate::types::{ImageRef, ProviderKind, ProviderOutcome};

use super::normalize_result;

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    include_images: bool,
    max_results: usize,
}

#[derive(Debug, Default, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
    #[serde(default)]
    images: Vec<TavilyImage>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TavilyImage {
    Url(String),
    Described { url: String },
}

impl TavilyImage {
    fn into_url(self) -> String {
        match self {
            Self::Url(url) | Self::Described { url } => url,
        }
    }
}

/// Tavily search API adapter.
#[derive(Debug, Clone)]
pub struct TavilyAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_results: usize,
}

impl TavilyAdapter {
    /// Create an adapter using `config` for timeout and result count.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(config.provider_timeout())?,
            api_key: api_key.to_owned(),
            base_url: "https://api.tavily.com".into(),
            max_results: config.results_per_provider,
        })
    }

    /// Point the adapter at a different base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_owned();
        self
    }
}

#[async_trait]
impl ProviderAdapter for TavilyAdapter {
    async fn search(&self, query: &str) -> Result<ProviderOutcome, SearchError> {
        tracing::trace!(query, "Tavily search");

        let request = TavilyRequest {
            query,
            search_depth: "basic",
            include_images: true,
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(http::endpoint(&self.base_url, "/search"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Tavily request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Tavily HTTP error: {e}")))?;

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("Tavily response decode failed: {e}")))?;

        Ok(into_outcome(body))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Tavily
    }
}

fn into_outcome(body: TavilyResponse) -> ProviderOutcome {
    let results = body
        .results
        .into_iter()
        .filter_map(|r| normalize_result(r.title, r.url, r.content, "Tavily Result"))
        .collect();
    let images: Vec<ImageRef> = body
        .images
        .into_iter()
        .map(TavilyImage::into_url)
        .filter(|url| !url.trim().is_empty())
        .collect();
    ProviderOutcome {
        engine: ProviderKind::Tavily,
        results,
        images,
    }
}

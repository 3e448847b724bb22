//! SerpApi transport and the Tier-A Google web adapter.
//!
//! SerpApi fronts both Google web search and Google Scholar. The web
//! adapter lives here; the academic router reuses [`SerpApiClient`] with
//! its own templated parameters.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::ProviderAdapter;
use crate::types::{ProviderKind, ProviderOutcome, SearchResult};

use super::normalize_result;

/// Default SerpApi base URL.
const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// Decoded SerpApi response. Only the fields this crate reads are declared.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SerpResponse {
    #[serde(default)]
    pub(crate) organic_results: Vec<OrganicResult>,
    pub(crate) error: Option<String>,
}

/// One organic result, shared by Google web and Google Scholar.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct OrganicResult {
    pub(crate) title: Option<String>,
    pub(crate) link: Option<String>,
    pub(crate) snippet: Option<String>,
    pub(crate) displayed_link: Option<String>,
    pub(crate) publication_info: Option<PublicationInfo>,
    #[serde(default)]
    pub(crate) resources: Vec<Resource>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PublicationInfo {
    pub(crate) summary: Option<String>,
}

/// An attached Scholar resource (often a PDF mirror).
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Resource {
    pub(crate) link: Option<String>,
}

/// Thin authenticated SerpApi client.
#[derive(Debug, Clone)]
pub struct SerpApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerpApiClient {
    /// Create a client with the given key and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, timeout: std::time::Duration) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(timeout)?,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
        })
    }

    /// Point the client at a different base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_owned();
        self
    }

    /// Issue one `/search` call with the given parameters.
    pub(crate) async fn fetch(&self, params: &[(&str, String)]) -> Result<SerpResponse, SearchError> {
        let response = self
            .client
            .get(http::endpoint(&self.base_url, "/search"))
            .query(params)
            .query(&[("api_key", self.api_key.as_str())])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("SerpApi request failed: {}", e.without_url())))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("SerpApi HTTP error: {}", e.without_url())))?;

        let body: SerpResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("SerpApi response decode failed: {e}")))?;

        if let Some(message) = body.error.as_deref() {
            return Err(SearchError::Http(format!("SerpApi rejected request: {message}")));
        }
        Ok(body)
    }
}

/// Tier-A keyword-ranked Google web search through SerpApi.
#[derive(Debug, Clone)]
pub struct GoogleAdapter {
    client: SerpApiClient,
    num: usize,
}

impl GoogleAdapter {
    /// Create an adapter using `config` for timeout and result count.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: SerpApiClient::new(api_key, config.provider_timeout())?,
            num: config.results_per_provider,
        })
    }

    /// Point the adapter at a different SerpApi base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl ProviderAdapter for GoogleAdapter {
    async fn search(&self, query: &str) -> Result<ProviderOutcome, SearchError> {
        tracing::trace!(query, "Google search");
        let params = [
            ("engine", "google".to_owned()),
            ("q", query.to_owned()),
            ("num", self.num.to_string()),
            ("hl", "ko".to_owned()),
            ("gl", "kr".to_owned()),
        ];
        let body = self.client.fetch(&params).await?;
        Ok(ProviderOutcome {
            engine: ProviderKind::Google,
            results: parse_organic(body.organic_results),
            images: vec![],
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }
}

/// Map organic results onto the common shape.
fn parse_organic(organic: Vec<OrganicResult>) -> Vec<SearchResult> {
    organic
        .into_iter()
        .filter_map(|item| normalize_result(item.title, item.link, item.snippet, "Google Result"))
        .collect()
}

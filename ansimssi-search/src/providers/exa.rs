//! Exa: Tier-C neural search over full page contents.
//!
//! Exa returns page text rather than snippets, so content is cut to a
//! snippet-sized prefix before it joins the merged result set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::ProviderAdapter;
use crate::types::{ProviderKind, ProviderOutcome};

use super::{normalize_result, truncate_chars};

/// Characters of page text kept as result content.
const CONTENT_CHARS: usize = 300;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaRequest<'a> {
    query: &'a str,
    num_results: usize,
    use_autoprompt: bool,
    contents: ExaContents,
}

#[derive(Debug, Serialize)]
struct ExaContents {
    text: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Debug, Deserialize)]
struct ExaResult {
    title: Option<String>,
    url: Option<String>,
    text: Option<String>,
}

/// Exa search API adapter.
#[derive(Debug, Clone)]
pub struct ExaAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    num_results: usize,
}

impl ExaAdapter {
    /// Create an adapter using `config` for timeout and result count.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(config.provider_timeout())?,
            api_key: api_key.to_owned(),
            base_url: "https://api.exa.ai".into(),
            num_results: config.results_per_provider,
        })
    }

    /// Point the adapter at a different base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_owned();
        self
    }
}

#[async_trait]
impl ProviderAdapter for ExaAdapter {
    async fn search(&self, query: &str) -> Result<ProviderOutcome, SearchError> {
        tracing::trace!(query, "Exa search");

        let request = ExaRequest {
            query,
            num_results: self.num_results,
            use_autoprompt: true,
            contents: ExaContents { text: true },
        };

        let response = self
            .client
            .post(http::endpoint(&self.base_url, "/search"))
            .header("x-api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Exa request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Exa HTTP error: {e}")))?;

        let body: ExaResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("Exa response decode failed: {e}")))?;

        Ok(into_outcome(body))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Exa
    }
}

fn into_outcome(body: ExaResponse) -> ProviderOutcome {
    let results = body
        .results
        .into_iter()
        .filter_map(|r| {
            let content = r.text.map(|t| truncate_chars(t.trim(), CONTENT_CHARS));
            normalize_result(r.title, r.url, content, "Exa Result")
        })
        .collect();
    ProviderOutcome {
        engine: ProviderKind::Exa,
        results,
        images: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case() {
        let request = ExaRequest {
            query: "고혈압",
            num_results: 5,
            use_autoprompt: true,
            contents: ExaContents { text: true },
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["numResults"], 5);
        assert_eq!(json["useAutoprompt"], true);
        assert_eq!(json["contents"]["text"], true);
    }

    #[test]
    fn long_text_is_truncated() {
        let long = "가".repeat(400);
        let body = ExaResponse {
            results: vec![ExaResult {
                title: Some("Long".into()),
                url: Some("https://a.kr".into()),
                text: Some(long),
            }],
        };
        let outcome = into_outcome(body);
        let content = &outcome.results[0].content;
        assert!(content.ends_with("..."));
        assert_eq!(content.chars().count(), CONTENT_CHARS + 3);
    }

    #[test]
    fn missing_title_defaults() {
        let json = r#"{"results": [{"url": "https://exa.kr/x", "text": "짧은 글"}, {"title": "no url"}]}"#;
        let body: ExaResponse = serde_json::from_str(json).expect("decode");
        let outcome = into_outcome(body);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].title, "Exa Result");
        assert_eq!(outcome.results[0].content, "짧은 글");
    }

    #[test]
    fn kind_is_exa() {
        let adapter = ExaAdapter::new("key", &SearchConfig::default()).expect("adapter");
        assert_eq!(adapter.kind(), ProviderKind::Exa);
    }
}

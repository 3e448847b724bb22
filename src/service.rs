//! Wiring of the search crate into one host-level service.
//!
//! [`SearchService`] owns the aggregator, the academic router and, when
//! learning is enabled, the background [`KnowledgeLearner`]. It must be
//! built inside a Tokio runtime because the learner spawns its worker.

use std::sync::Arc;

use ansimssi_search::{
    AcademicPaper, AcademicRouter, Aggregator, ApiKeys, KnowledgeLearner, KnowledgeStore,
    ProviderKind, ProviderRegistry, SearchResponse, SerpApiClient,
};

use crate::config::AppConfig;
use crate::error::Result;

/// Search entry points for the host.
#[derive(Debug)]
pub struct SearchService {
    aggregator: Aggregator,
    academic: AcademicRouter,
    learner: Option<KnowledgeLearner>,
}

impl SearchService {
    /// Build the service from configuration and provider keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or an HTTP client cannot
    /// be built. A knowledge store that cannot be opened is logged and
    /// left out: searches still run, with catalog fallback only and no
    /// learning.
    pub fn from_config(config: &AppConfig, keys: &ApiKeys) -> Result<Self> {
        config.validate()?;

        let registry = ProviderRegistry::from_keys(keys, &config.endpoints, &config.search)?;
        if registry.is_empty() {
            tracing::warn!("no provider API keys configured; answers come from fallback only");
        }

        let store = match KnowledgeStore::open(
            &config.knowledge.path,
            config.search.knowledge_match_threshold,
        ) {
            Ok(store) => Some(Arc::new(store)),
            Err(err) => {
                tracing::error!(
                    error = %err,
                    path = %config.knowledge.path.display(),
                    "knowledge store unavailable; continuing without learned answers"
                );
                None
            }
        };
        let mut aggregator = Aggregator::new(registry, config.search.clone())?;
        if let Some(store) = &store {
            aggregator = aggregator.with_knowledge(Arc::clone(store));
        }

        let academic = match keys.get(ProviderKind::Google) {
            Some(key) => AcademicRouter::new(
                SerpApiClient::new(key, config.search.provider_timeout())?
                    .with_base_url(&config.endpoints.serpapi),
            ),
            None => {
                tracing::debug!("no SerpApi key; academic search serves reference papers");
                AcademicRouter::offline()
            }
        };

        let learner = store
            .filter(|_| config.knowledge.learn)
            .map(KnowledgeLearner::spawn);

        Ok(Self {
            aggregator,
            academic,
            learner,
        })
    }

    /// Aggregated search.
    ///
    /// # Errors
    ///
    /// Returns an error only for a blank query.
    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        Ok(self.aggregator.search(query).await?)
    }

    /// Queue `answer` for learning if `response` came from live providers.
    pub fn learn(&self, query: &str, answer: impl Into<String>, response: &SearchResponse) -> bool {
        match &self.learner {
            Some(learner) => learner.record(query, answer, response),
            None => false,
        }
    }

    /// Academic and institutional document search.
    pub async fn academic(&self, query: &str) -> Vec<AcademicPaper> {
        self.academic.search(query).await
    }

    /// Drain pending learning work.
    pub async fn shutdown(self) {
        if let Some(learner) = self.learner {
            learner.shutdown().await;
        }
    }
}

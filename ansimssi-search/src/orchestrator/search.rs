//! Core aggregator: concurrent provider race, adaptive wait, merge, fallback.
//!
//! Every registered provider runs on its own task. The aggregator waits for
//! the first phase, checks how many results have arrived and only extends
//! into the second phase when the yield is below the richness threshold
//! and providers are still pending. Stragglers are aborted and whatever
//! they would have returned is discarded.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::catalog::MockCatalog;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::knowledge::KnowledgeStore;
use crate::provider::ProviderRegistry;
use crate::types::{Provenance, ProviderOutcome, SearchResponse};

use super::dedup::merge_outcomes;

/// Multi-provider search with knowledge-base and catalog fallback.
#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: ProviderRegistry,
    knowledge: Option<Arc<KnowledgeStore>>,
    catalog: MockCatalog,
    config: SearchConfig,
}

impl Aggregator {
    /// Create an aggregator racing the providers in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails validation.
    pub fn new(registry: ProviderRegistry, config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            registry,
            knowledge: None,
            catalog: MockCatalog::new(),
            config,
        })
    }

    /// Consult `store` before the catalog when no provider yields results.
    pub fn with_knowledge(mut self, store: Arc<KnowledgeStore>) -> Self {
        self.knowledge = Some(store);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The providers this aggregator races.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Search every registered provider and merge what arrives in time.
    ///
    /// # Pipeline
    ///
    /// 1. Spawn one task per provider, each bounded by the provider timeout
    /// 2. Collect outcomes in completion order until the first-phase deadline
    /// 3. Escalate to the second phase only if the yield is too small and
    ///    providers are still pending
    /// 4. Abort stragglers
    /// 5. Merge with first-seen-wins dedup
    /// 6. Fall back to the knowledge store, then the catalog, when empty
    /// 7. Truncate to `config.max_results`
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] for a blank query. Provider
    /// failures never surface as errors.
    pub async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery("query must not be empty".into()));
        }
        tracing::debug!(query, providers = self.registry.len(), "aggregated search started");

        let outcomes = self.race(query).await;
        let merged = merge_outcomes(outcomes);

        let mut response = if !merged.results.is_empty() {
            let provenance = match merged.contributors.as_slice() {
                [single] => Provenance::Engine(*single),
                _ => Provenance::HybridAggregation,
            };
            SearchResponse {
                results: merged.results,
                images: merged.images,
                provenance,
            }
        } else {
            self.fallback(query).await
        };

        response.results.truncate(self.config.max_results);
        tracing::info!(
            provenance = %response.provenance,
            count = response.results.len(),
            images = response.images.len(),
            "aggregated search finished"
        );
        Ok(response)
    }

    /// Run the provider race and return outcomes in completion order.
    async fn race(&self, query: &str) -> Vec<ProviderOutcome> {
        let mut outcomes = Vec::new();
        if self.registry.is_empty() {
            return outcomes;
        }

        let timeout = self.config.provider_timeout();
        let mut tasks = JoinSet::new();
        for provider in self.registry.iter() {
            let provider = Arc::clone(provider);
            let query = query.to_owned();
            tasks.spawn(async move { provider.query(&query, timeout).await });
        }

        let started = Instant::now();
        let phase_one_deadline = started + self.config.phase_one_wait();
        collect_until(&mut tasks, phase_one_deadline, &mut outcomes).await;

        let yield_count: usize = outcomes.iter().map(|o| o.results.len()).sum();
        if yield_count < self.config.min_results && !tasks.is_empty() {
            tracing::info!(
                yield_count,
                pending = tasks.len(),
                "low yield after first phase; extending wait"
            );
            let phase_two_deadline = phase_one_deadline + self.config.phase_two_wait();
            collect_until(&mut tasks, phase_two_deadline, &mut outcomes).await;
        } else {
            tracing::debug!(yield_count, "first phase sufficient");
        }

        if !tasks.is_empty() {
            tracing::debug!(pending = tasks.len(), "aborting pending providers");
            tasks.abort_all();
        }
        outcomes
    }

    /// Knowledge store first, then the static catalog.
    async fn fallback(&self, query: &str) -> SearchResponse {
        if let Some(store) = &self.knowledge {
            let store = Arc::clone(store);
            let owned = query.to_owned();
            let found = tokio::task::spawn_blocking(move || store.find_match(&owned))
                .await
                .unwrap_or_else(|err| {
                    tracing::error!(error = %err, "knowledge lookup task failed");
                    None
                });
            match found {
                Some(entry) if !entry.sources.is_empty() => {
                    tracing::debug!(matched = %entry.query, "serving learned answer");
                    return SearchResponse {
                        results: entry.sources,
                        images: entry.images,
                        provenance: Provenance::KnowledgeBase,
                    };
                }
                Some(_) => tracing::debug!("knowledge match has no sources; skipping"),
                None => {}
            }
        }

        tracing::info!("no live or learned results; serving catalog");
        let (results, images) = self.catalog.lookup(query);
        SearchResponse {
            results,
            images,
            provenance: Provenance::Mock,
        }
    }
}

/// Drain finished provider tasks into `outcomes` until `deadline` or until
/// no tasks remain.
async fn collect_until(
    tasks: &mut JoinSet<Option<ProviderOutcome>>,
    deadline: Instant,
    outcomes: &mut Vec<ProviderOutcome>,
) {
    while !tasks.is_empty() {
        match tokio::time::timeout_at(deadline, tasks.join_next()).await {
            Ok(Some(Ok(Some(outcome)))) => outcomes.push(outcome),
            Ok(Some(Ok(None))) => {}
            Ok(Some(Err(err))) => tracing::warn!(error = %err, "provider task failed"),
            Ok(None) | Err(_) => break,
        }
    }
}

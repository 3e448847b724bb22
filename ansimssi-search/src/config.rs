//! Aggregation configuration with sensible defaults.
//!
//! [`SearchConfig`] holds the latency/quality policy of the aggregator:
//! which providers race, how long each phase waits, how many results
//! count as "rich enough", and the knowledge store acceptance score.
//! None of these values are authoritative; they are tuned empirically.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SearchError;
use crate::types::ProviderKind;

/// Configuration for an aggregated search.
///
/// Every field is defaulted during deserialisation, so a TOML section only
/// needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Providers raced on every search, when their API keys are present.
    pub providers: Vec<ProviderKind>,
    /// Hard timeout for a single provider call, in milliseconds.
    pub provider_timeout_ms: u64,
    /// First-phase wait before the yield check, in milliseconds.
    pub phase_one_wait_ms: u64,
    /// Extended wait used when the first phase yields too little, in milliseconds.
    pub phase_two_wait_ms: u64,
    /// Richness threshold: results needed after phase one to skip escalation.
    pub min_results: usize,
    /// Maximum number of results returned to the caller.
    pub max_results: usize,
    /// Number of results requested from each provider.
    pub results_per_provider: usize,
    /// Minimum fuzzy score for a knowledge entry to be served.
    pub knowledge_match_threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            providers: vec![ProviderKind::Tavily, ProviderKind::Google, ProviderKind::Exa],
            provider_timeout_ms: 4_000,
            phase_one_wait_ms: 2_000,
            phase_two_wait_ms: 2_000,
            min_results: 4,
            max_results: 12,
            results_per_provider: 5,
            knowledge_match_threshold: 15.0,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results` and `results_per_provider` must be greater than 0
    /// - `provider_timeout_ms` and `phase_one_wait_ms` must be greater than 0
    /// - `provider_timeout_ms` must not exceed the total of both phases
    /// - `knowledge_match_threshold` must be a finite, non-negative number
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.results_per_provider == 0 {
            return Err(SearchError::Config(
                "results_per_provider must be greater than 0".into(),
            ));
        }
        if self.provider_timeout_ms == 0 {
            return Err(SearchError::Config(
                "provider_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.phase_one_wait_ms == 0 {
            return Err(SearchError::Config(
                "phase_one_wait_ms must be greater than 0".into(),
            ));
        }
        if self.provider_timeout_ms > self.phase_one_wait_ms + self.phase_two_wait_ms {
            return Err(SearchError::Config(
                "provider_timeout_ms must not exceed phase_one_wait_ms + phase_two_wait_ms".into(),
            ));
        }
        if !self.knowledge_match_threshold.is_finite() || self.knowledge_match_threshold < 0.0 {
            return Err(SearchError::Config(
                "knowledge_match_threshold must be a non-negative number".into(),
            ));
        }
        Ok(())
    }

    /// Per-provider hard timeout.
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    /// First-phase wait.
    pub fn phase_one_wait(&self) -> Duration {
        Duration::from_millis(self.phase_one_wait_ms)
    }

    /// Escalated second-phase wait.
    pub fn phase_two_wait(&self) -> Duration {
        Duration::from_millis(self.phase_two_wait_ms)
    }
}

/// Base URLs of the provider APIs.
///
/// Overridable so adapters can be pointed at a proxy or a local mock server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoints {
    /// SerpApi base URL (Google web and Google Scholar).
    pub serpapi: String,
    /// Tavily API base URL.
    pub tavily: String,
    /// Exa API base URL.
    pub exa: String,
    /// Brave Search API base URL.
    pub brave: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            serpapi: "https://serpapi.com".into(),
            tavily: "https://api.tavily.com".into(),
            exa: "https://api.exa.ai".into(),
            brave: "https://api.search.brave.com".into(),
        }
    }
}

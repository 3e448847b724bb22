//! Trait definition for pluggable search providers and the registry the
//! aggregator races.
//!
//! Each backend (SerpApi Google, Tavily, Exa, Brave) implements
//! [`ProviderAdapter`] and translates its native response fields into
//! [`SearchResult`](crate::types::SearchResult) values. The aggregator only
//! ever sees normalised [`ProviderOutcome`]s.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ProviderEndpoints, SearchConfig};
use crate::error::SearchError;
use crate::providers::{BraveAdapter, ExaAdapter, GoogleAdapter, TavilyAdapter};
use crate::types::{ProviderKind, ProviderOutcome};

/// A pluggable search provider backend.
///
/// Implementors handle their own:
///
/// - Request construction and authentication
/// - Decoding of the provider's native response shape
/// - Field translation with explicit defaults (title, url, content)
///
/// Implementations must not retry. All implementations must be
/// `Send + Sync` so they can be raced on separate tasks.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Perform one provider call and return the normalised outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, the provider rejects
    /// the credentials, or the response cannot be decoded.
    async fn search(&self, query: &str) -> Result<ProviderOutcome, SearchError>;

    /// Returns which [`ProviderKind`] this implementation represents.
    fn kind(&self) -> ProviderKind;

    /// Time-bounded call that never fails past the adapter boundary.
    ///
    /// Errors, timeouts and empty result sets all collapse to `None`.
    async fn query(&self, query: &str, timeout: Duration) -> Option<ProviderOutcome> {
        let kind = self.kind();
        match tokio::time::timeout(timeout, self.search(query)).await {
            Ok(Ok(outcome)) if !outcome.results.is_empty() => {
                tracing::debug!(engine = %kind, count = outcome.results.len(), "provider returned results");
                Some(outcome)
            }
            Ok(Ok(_)) => {
                tracing::debug!(engine = %kind, "provider returned no results");
                None
            }
            Ok(Err(err)) => {
                tracing::warn!(engine = %kind, error = %err, "provider query failed");
                None
            }
            Err(_) => {
                tracing::warn!(engine = %kind, timeout_ms = timeout.as_millis() as u64, "provider timed out");
                None
            }
        }
    }
}

/// Provider API keys, keyed by provider.
///
/// The `Debug` output never contains key material.
#[derive(Clone, Default)]
pub struct ApiKeys {
    keys: HashMap<ProviderKind, String>,
}

impl ApiKeys {
    /// Read every provider's key from its environment variable.
    ///
    /// Unset or blank variables are skipped.
    pub fn from_env() -> Self {
        let mut keys = Self::default();
        for kind in ProviderKind::all() {
            if let Ok(value) = std::env::var(kind.api_key_var()) {
                keys = keys.with(*kind, value);
            }
        }
        keys
    }

    /// Add or replace the key for `kind`. Blank keys are ignored.
    pub fn with(mut self, kind: ProviderKind, key: impl Into<String>) -> Self {
        let key = key.into();
        let key = key.trim();
        if !key.is_empty() {
            self.keys.insert(kind, key.to_owned());
        }
        self
    }

    /// Returns the key for `kind`, if one is configured.
    pub fn get(&self, kind: ProviderKind) -> Option<&str> {
        self.keys.get(&kind).map(String::as_str)
    }
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut configured: Vec<&str> = self.keys.keys().map(ProviderKind::name).collect();
        configured.sort_unstable();
        f.debug_struct("ApiKeys")
            .field("configured", &configured)
            .finish()
    }
}

/// The set of providers one aggregator races.
///
/// Built once at startup and injected into [`crate::Aggregator`]; tests
/// register their own doubles.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// An empty registry. Searches against it go straight to fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build adapters for every provider in `config.providers` that has a key.
    ///
    /// Providers without a key are skipped, not treated as errors.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if an HTTP client cannot be built.
    pub fn from_keys(
        keys: &ApiKeys,
        endpoints: &ProviderEndpoints,
        config: &SearchConfig,
    ) -> Result<Self, SearchError> {
        let mut registry = Self::new();
        for kind in &config.providers {
            if registry.kinds().contains(kind) {
                continue;
            }
            let Some(key) = keys.get(*kind) else {
                tracing::debug!(engine = %kind, "no API key configured; provider not registered");
                continue;
            };
            registry = match kind {
                ProviderKind::Google => registry
                    .with(GoogleAdapter::new(key, config)?.with_base_url(&endpoints.serpapi)),
                ProviderKind::Tavily => registry
                    .with(TavilyAdapter::new(key, config)?.with_base_url(&endpoints.tavily)),
                ProviderKind::Exa => {
                    registry.with(ExaAdapter::new(key, config)?.with_base_url(&endpoints.exa))
                }
                ProviderKind::Brave => {
                    registry.with(BraveAdapter::new(key, config)?.with_base_url(&endpoints.brave))
                }
            };
        }
        tracing::info!(providers = ?registry.kinds(), "provider registry built");
        Ok(registry)
    }

    /// Register a provider.
    pub fn with(mut self, provider: impl ProviderAdapter + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Register an already shared provider.
    pub fn with_shared(mut self, provider: Arc<dyn ProviderAdapter>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Iterate over the registered providers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ProviderAdapter>> {
        self.providers.iter()
    }

    /// Kinds of the registered providers, in registration order.
    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no providers are registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.kinds())
            .finish()
    }
}

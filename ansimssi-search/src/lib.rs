//! # ansimssi-search
//!
//! Multi-provider health information search for Ansimssi.
//!
//! A query is raced across several paid search APIs at once. Whatever
//! arrives within a short deadline is merged and deduplicated; when the
//! providers return nothing, answers previously learned from live results
//! are served, and as a last resort a fixed catalog of vetted health
//! resources. Callers always get a result set and a provenance tag.
//!
//! ## Design
//!
//! - [`ProviderAdapter`] per backend: SerpApi Google, Tavily, Exa, Brave
//! - [`Aggregator`] runs a two-phase adaptive wait with an escalation gate
//! - [`KnowledgeStore`] persists live answers as a JSON array, fed in the
//!   background by [`KnowledgeLearner`]
//! - [`MockCatalog`] provides deterministic last-resort results
//! - [`AcademicRouter`] answers document searches with one routed call
//!
//! ## Security
//!
//! - API keys are read from the environment and never logged
//! - Query text is logged only at debug level and below
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> ansimssi_search::Result<()> {
//! use ansimssi_search::{Aggregator, ApiKeys, ProviderEndpoints, ProviderRegistry, SearchConfig};
//!
//! let config = SearchConfig::default();
//! let registry = ProviderRegistry::from_keys(&ApiKeys::from_env(), &ProviderEndpoints::default(), &config)?;
//! let aggregator = Aggregator::new(registry, config)?;
//! let response = aggregator.search("보건소 진료 시간").await?;
//! for result in &response.results {
//!     println!("{}: {}", result.title, result.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod academic;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod knowledge;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod types;

pub use academic::{AcademicIntent, AcademicRouter, PaperSource};
pub use catalog::MockCatalog;
pub use config::{ProviderEndpoints, SearchConfig};
pub use error::{Result, SearchError};
pub use knowledge::{Interaction, KnowledgeEntry, KnowledgeLearner, KnowledgeStore};
pub use orchestrator::Aggregator;
pub use provider::{ApiKeys, ProviderAdapter, ProviderRegistry};
pub use providers::{BraveAdapter, ExaAdapter, GoogleAdapter, SerpApiClient, TavilyAdapter};
pub use types::{
    AcademicPaper, ImageRef, Provenance, ProviderKind, ProviderOutcome, SearchResponse, SearchResult,
};

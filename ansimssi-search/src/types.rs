//! Core types for aggregated search results and provider identification.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An image URL attached to a search response.
pub type ImageRef = String;

/// A single normalised search result.
///
/// `url` is the identity of a result: merged output never contains two
/// results with the same url.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Page URL. Never empty in aggregated output.
    pub url: String,
    /// Snippet or extracted text for the page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Provider that first reported this result. `None` for catalog entries.
    #[serde(default, rename = "source_engine", skip_serializing_if = "Option::is_none")]
    pub engine: Option<ProviderKind>,
}

impl SearchResult {
    /// Build an untagged result.
    pub fn new(title: impl Into<String>, url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            engine: None,
        }
    }
}

/// Deserialize a JSON `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// External search backends the aggregator can race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Tier A: keyword-ranked Google results through SerpApi.
    Google,
    /// Tier B: AI-curated web search with images.
    Tavily,
    /// Tier C: neural / semantic content search.
    Exa,
    /// Tier D: low-cost backup web search.
    Brave,
}

impl ProviderKind {
    /// Returns the stable lowercase name of this provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Tavily => "tavily",
            Self::Exa => "exa",
            Self::Brave => "brave",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::Google => "SERPAPI_API_KEY",
            Self::Tavily => "TAVILY_API_KEY",
            Self::Exa => "EXA_API_KEY",
            Self::Brave => "BRAVE_API_KEY",
        }
    }

    /// Look up a provider by its [`name`](Self::name), ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Returns all provider variants.
    pub fn all() -> &'static [ProviderKind] {
        &[Self::Google, Self::Tavily, Self::Exa, Self::Brave]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What one provider produced for one query.
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    /// The provider that produced the outcome.
    pub engine: ProviderKind,
    /// Normalised results, in the provider's ranking order.
    pub results: Vec<SearchResult>,
    /// Image URLs returned alongside the results.
    pub images: Vec<ImageRef>,
}

/// Which tier ultimately produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Exactly one live provider contributed results.
    Engine(ProviderKind),
    /// Two or more live providers contributed results.
    HybridAggregation,
    /// No live results; served from a learned knowledge entry.
    KnowledgeBase,
    /// No live results and no knowledge match; static catalog data.
    Mock,
}

impl Provenance {
    /// Returns the wire tag for this provenance.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Engine(kind) => kind.name(),
            Self::HybridAggregation => "hybrid_aggregation",
            Self::KnowledgeBase => "knowledge_base",
            Self::Mock => "mock",
        }
    }

    /// Whether the results came from live providers in this call.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Engine(_) | Self::HybridAggregation)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Provenance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The answer to one [`crate::Aggregator::search`] call.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// Deduplicated, truncated results.
    pub results: Vec<SearchResult>,
    /// Image URLs gathered alongside the results.
    pub images: Vec<ImageRef>,
    /// Which tier produced `results`.
    pub provenance: Provenance,
}

/// A scholarly or institutional document returned by the academic router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicPaper {
    /// Document title.
    pub title: String,
    /// Direct link, a PDF where one was found.
    pub link: String,
    /// Short description.
    pub snippet: String,
    /// Publisher or source line.
    pub publication_info: String,
    /// Publication year, empty when none could be parsed.
    pub year: String,
}

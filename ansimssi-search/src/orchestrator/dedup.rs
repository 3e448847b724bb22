//! Merge of provider outcomes with first-seen-wins deduplication.
//!
//! Outcomes are consumed in provider-completion order. The first result
//! reported for a url survives and is tagged with the engine that reported
//! it; later duplicates are dropped. Images are merged the same way.

use std::collections::HashSet;

use url::Url;

use crate::types::{ImageRef, ProviderKind, ProviderOutcome, SearchResult};

/// Merged, deduplicated material from one aggregation round.
#[derive(Debug, Clone, Default)]
pub struct MergedResults {
    /// Unique results, in merge order.
    pub results: Vec<SearchResult>,
    /// Unique image URLs, in merge order.
    pub images: Vec<ImageRef>,
    /// Engines with at least one surviving result, in order of first contribution.
    pub contributors: Vec<ProviderKind>,
}

/// Merge outcomes in the order given, keeping the first result per url.
pub fn merge_outcomes(outcomes: impl IntoIterator<Item = ProviderOutcome>) -> MergedResults {
    let mut merged = MergedResults::default();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_images: HashSet<String> = HashSet::new();

    for outcome in outcomes {
        let engine = outcome.engine;
        let mut contributed = 0usize;

        for mut result in outcome.results {
            if result.url.trim().is_empty() {
                continue;
            }
            if !seen_urls.insert(url_key(&result.url)) {
                continue;
            }
            result.engine = Some(engine);
            merged.results.push(result);
            contributed += 1;
        }

        for image in outcome.images {
            if seen_images.insert(image.trim().to_owned()) {
                merged.images.push(image);
            }
        }

        if contributed > 0 {
            tracing::debug!(%engine, contributed, "engine contributed results");
            merged.contributors.push(engine);
        }
    }

    merged
}

/// Comparison key for a result url.
///
/// Scheme and host case, the fragment and a trailing path slash do not
/// distinguish two results. Unparseable urls compare verbatim.
pub fn url_key(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_owned();
    };
    parsed.set_fragment(None);

    let path = parsed.path().to_owned();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }
    parsed.to_string()
}

//! Search orchestration: the provider race and the merge of its outcomes.
//!
//! [`search::Aggregator`] owns the concurrency policy and fallback chain;
//! [`dedup`] turns completion-ordered outcomes into one deduplicated list.

pub mod dedup;
pub mod search;

pub use dedup::{merge_outcomes, url_key, MergedResults};
pub use search::Aggregator;

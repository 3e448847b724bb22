//! Self-learning knowledge store: the first fallback tier.
//!
//! Successful live answers are appended to a JSON file through a
//! background [`KnowledgeLearner`]; when every provider comes back empty,
//! the aggregator asks [`KnowledgeStore::find_match`] for the closest
//! previously answered query.

pub mod learner;
pub mod store;

pub use learner::KnowledgeLearner;
pub use store::{derive_keywords, match_score, Interaction, KnowledgeEntry, KnowledgeStore};

//! Error types for the ansimssi-search crate.
//!
//! Provider failures never surface through these types to the caller of
//! [`crate::Aggregator::search`]; they are recovered at the adapter
//! boundary. What remains is caller misuse, configuration mistakes and
//! knowledge store persistence failures. No API keys appear in messages.

/// Errors that can occur during search aggregation.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The caller's query was empty or whitespace only.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// An HTTP request to a search provider failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A provider response could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Knowledge store read or write failure.
    #[error("knowledge store error: {0}")]
    Knowledge(String),
}

/// Convenience type alias for ansimssi-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

//! Shared HTTP client construction for provider API calls.
//!
//! Every adapter owns a [`reqwest::Client`] built here so the per-call
//! timeout is enforced by the transport as well as by the aggregator.

use crate::error::SearchError;
use std::time::Duration;

/// User-Agent sent to every provider API.
const USER_AGENT: &str = concat!("ansimssi-search/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] for provider API requests.
///
/// The client has:
/// - The given request timeout
/// - A stable crate User-Agent
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Join a base URL and an absolute API path without doubling slashes.
pub fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

//! Search provider implementations.
//!
//! Each module provides a struct implementing [`crate::provider::ProviderAdapter`]
//! for one provider API. Native field names are translated here and nowhere else.

pub mod brave;
pub mod exa;
pub mod serpapi;
pub mod tavily;

pub use brave::BraveAdapter;
pub use exa::ExaAdapter;
pub use serpapi::{GoogleAdapter, SerpApiClient};
pub use tavily::TavilyAdapter;

use crate::types::SearchResult;

/// Build a result from optional native fields.
///
/// Results without a non-blank url are dropped. A missing or blank title
/// falls back to `default_title`; missing content becomes empty.
pub(crate) fn normalize_result(
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
    default_title: &str,
) -> Option<SearchResult> {
    let url = url.map(|u| u.trim().to_owned()).filter(|u| !u.is_empty())?;
    let title = title
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default_title.to_owned());
    let content = content.map(|c| c.trim().to_owned()).unwrap_or_default();
    Some(SearchResult::new(title, url, content))
}

/// Keep at most `max_chars` characters, marking the cut with `...`.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_url_is_dropped() {
        assert!(normalize_result(Some("t".into()), None, None, "x").is_none());
        assert!(normalize_result(Some("t".into()), Some("  ".into()), None, "x").is_none());
    }

    #[test]
    fn missing_title_uses_default() {
        let result = normalize_result(None, Some("https://a.kr".into()), None, "Untitled")
            .expect("url present");
        assert_eq!(result.title, "Untitled");
        assert_eq!(result.content, "");
        assert!(result.engine.is_none());
    }

    #[test]
    fn fields_are_trimmed() {
        let result = normalize_result(
            Some(" 감기 ".into()),
            Some(" https://a.kr ".into()),
            Some(" 내용 ".into()),
            "x",
        )
        .expect("url present");
        assert_eq!(result.title, "감기");
        assert_eq!(result.url, "https://a.kr");
        assert_eq!(result.content, "내용");
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate_chars("보건소안내", 3), "보건소...");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exact", 5), "exact");
    }
}

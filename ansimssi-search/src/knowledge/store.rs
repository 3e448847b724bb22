//! JSON-file backed store of past interactions with scored fuzzy lookup.
//!
//! The file holds a flat array of [`KnowledgeEntry`] records in insertion
//! order. Every save rewrites the whole file (temp file + rename) while
//! holding the store's write lock, so overlapping saves never lose an
//! entry. Lookups re-read the file so entries saved by another process
//! are visible.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SearchError;
use crate::types::{null_as_default, ImageRef, ProviderKind, SearchResult};

/// Score contributed by each keyword shared with a stored query.
const KEYWORD_WEIGHT: f64 = 10.0;
/// Score contributed by full string similarity (similarity is in `[0, 1]`).
const SIMILARITY_WEIGHT: f64 = 20.0;

/// One learned interaction.
///
/// Decoding is lenient: `null` fields take their defaults and source
/// records without a url are dropped, so files written by older versions
/// stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Generated identifier.
    #[serde(default = "new_id", deserialize_with = "id_or_new")]
    pub id: String,
    /// The original query text.
    pub query: String,
    /// Tokens derived from `query` by [`derive_keywords`].
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    /// The answer produced for the query.
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    /// Snapshot of the results the answer was built from.
    #[serde(default, deserialize_with = "stored_sources")]
    pub sources: Vec<SearchResult>,
    /// Snapshot of the images shown with the answer.
    #[serde(default, deserialize_with = "stored_images")]
    pub images: Vec<ImageRef>,
    #[serde(default = "Utc::now", deserialize_with = "timestamp_or_now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "timestamp_or_now")]
    pub updated_at: DateTime<Utc>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn id_or_new<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(new_id))
}

fn timestamp_or_now<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    Ok(Option::<DateTime<Utc>>::deserialize(deserializer)?.unwrap_or_else(Utc::now))
}

/// A source record as older writers stored it: every field may be absent or null.
#[derive(Deserialize)]
struct StoredSource {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
    #[serde(rename = "source_engine")]
    engine: Option<String>,
}

fn stored_sources<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<SearchResult>, D::Error> {
    let stored: Option<Vec<Option<StoredSource>>> = Option::deserialize(deserializer)?;
    Ok(stored
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|source| {
            let url = source.url.map(|u| u.trim().to_owned()).filter(|u| !u.is_empty())?;
            Some(SearchResult {
                title: source.title.unwrap_or_default(),
                url,
                content: source.content.unwrap_or_default(),
                engine: source.engine.as_deref().and_then(ProviderKind::from_name),
            })
        })
        .collect())
}

fn stored_images<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ImageRef>, D::Error> {
    let stored: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    Ok(stored
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter(|image| !image.trim().is_empty())
        .collect())
}

/// The answer material handed to [`KnowledgeStore::save_interaction`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interaction {
    pub answer: String,
    pub sources: Vec<SearchResult>,
    pub images: Vec<ImageRef>,
}

/// Durable, append-only interaction store.
#[derive(Debug)]
pub struct KnowledgeStore {
    path: PathBuf,
    threshold: f64,
    write_lock: Mutex<()>,
}

impl KnowledgeStore {
    /// Open the store at `path`, creating an empty file if none exists.
    ///
    /// `threshold` is the minimum fuzzy score [`find_match`](Self::find_match)
    /// accepts.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Knowledge`] if the file or its parent
    /// directory cannot be created.
    pub fn open(path: impl Into<PathBuf>, threshold: f64) -> Result<Self, SearchError> {
        let path = path.into();
        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| io_error("create directory", parent, e))?;
            }
            fs::write(&path, "[]").map_err(|e| io_error("create", &path, e))?;
            tracing::info!(path = %path.display(), "created empty knowledge store");
        }
        Ok(Self {
            path,
            threshold,
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored entry in storage order.
    ///
    /// A missing file reads as an empty store. Entries written without
    /// keywords get them derived here. An individual entry that cannot be
    /// decoded is logged and skipped; it is dropped on the next save.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Knowledge`] if the file cannot be read or is
    /// not a JSON array.
    pub fn load(&self) -> Result<Vec<KnowledgeEntry>, SearchError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("read", &self.path, e)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<serde_json::Value> = serde_json::from_str(&raw).map_err(|e| {
            SearchError::Knowledge(format!("failed to parse {}: {e}", self.path.display()))
        })?;

        let mut entries = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<KnowledgeEntry>(record) {
                Ok(mut entry) => {
                    if entry.keywords.is_empty() {
                        entry.keywords = derive_keywords(&entry.query);
                    }
                    entries.push(entry);
                }
                Err(err) => {
                    tracing::warn!(index, error = %err, "skipping unreadable knowledge entry");
                }
            }
        }
        Ok(entries)
    }

    /// Find the stored entry that best answers `query`.
    ///
    /// An exact query match wins immediately. Otherwise every entry is
    /// scored with [`match_score`] and the best one is returned if it
    /// reaches the acceptance threshold; on ties the earliest stored entry
    /// wins. Read failures are logged and treated as an empty store.
    pub fn find_match(&self, query: &str) -> Option<KnowledgeEntry> {
        let entries = match self.load() {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "knowledge store unreadable; treating as empty");
                return None;
            }
        };
        best_match(entries, query, self.threshold)
    }

    /// Record an interaction unless the exact query is already stored.
    ///
    /// Returns `true` if a new entry was appended. The whole file is
    /// rewritten before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] for a blank query and
    /// [`SearchError::Knowledge`] if the store cannot be read or written.
    pub fn save_interaction(&self, query: &str, interaction: Interaction) -> Result<bool, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery("cannot learn a blank query".into()));
        }

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut entries = self.load()?;
        if entries.iter().any(|e| e.query == query) {
            tracing::debug!("query already known; skipping save");
            return Ok(false);
        }

        let now = Utc::now();
        entries.push(KnowledgeEntry {
            id: new_id(),
            query: query.to_owned(),
            keywords: derive_keywords(query),
            answer: interaction.answer,
            sources: interaction.sources,
            images: interaction.images,
            created_at: now,
            updated_at: now,
        });
        self.persist(&entries)?;
        tracing::info!(entries = entries.len(), "learned new interaction");
        Ok(true)
    }

    fn persist(&self, entries: &[KnowledgeEntry]) -> Result<(), SearchError> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| SearchError::Knowledge(format!("failed to serialise entries: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| io_error("write", &tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error("replace", &self.path, e))
    }
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> SearchError {
    SearchError::Knowledge(format!("failed to {action} {}: {err}", path.display()))
}

/// Pick the best entry for `query` from `entries`.
fn best_match(entries: Vec<KnowledgeEntry>, query: &str, threshold: f64) -> Option<KnowledgeEntry> {
    if let Some(pos) = entries.iter().position(|e| e.query == query) {
        tracing::debug!("exact knowledge match");
        return entries.into_iter().nth(pos);
    }

    let query_keywords: HashSet<String> = derive_keywords(query).into_iter().collect();
    let mut best: Option<(usize, f64)> = None;
    for (idx, entry) in entries.iter().enumerate() {
        let score = match_score(query, &query_keywords, entry);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((idx, score));
        }
    }

    match best {
        Some((idx, score)) if score >= threshold => {
            tracing::debug!(score, "fuzzy knowledge match");
            entries.into_iter().nth(idx)
        }
        Some((_, score)) => {
            tracing::debug!(score, threshold, "best knowledge candidate below threshold");
            None
        }
        None => None,
    }
}

/// Score how well `entry` answers `query`.
///
/// `10 × shared keywords + 20 × normalised Levenshtein similarity`.
pub fn match_score(query: &str, query_keywords: &HashSet<String>, entry: &KnowledgeEntry) -> f64 {
    let shared = entry
        .keywords
        .iter()
        .filter(|k| query_keywords.contains(k.as_str()))
        .count();
    let similarity = strsim::normalized_levenshtein(query, &entry.query);
    KEYWORD_WEIGHT * shared as f64 + SIMILARITY_WEIGHT * similarity
}

/// Whitespace tokens longer than one character, lowercased, first occurrence kept.
pub fn derive_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .map(str::to_lowercase)
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

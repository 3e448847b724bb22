//! Background learning queue for the knowledge store.
//!
//! Saving an interaction rewrites the store file, which must not sit on a
//! request's response path. [`KnowledgeLearner`] accepts interactions over
//! an unbounded channel and a single worker task applies them one at a
//! time on the blocking pool. Failures are logged, never dropped silently.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::types::SearchResponse;

use super::store::{Interaction, KnowledgeStore};

struct LearnRequest {
    query: String,
    interaction: Interaction,
}

/// Handle to the background learning worker.
///
/// Must be created inside a Tokio runtime. Call [`shutdown`](Self::shutdown)
/// to drain pending saves before exiting.
#[derive(Debug)]
pub struct KnowledgeLearner {
    tx: mpsc::UnboundedSender<LearnRequest>,
    worker: JoinHandle<()>,
}

impl KnowledgeLearner {
    /// Spawn the worker that applies queued interactions to `store`.
    pub fn spawn(store: Arc<KnowledgeStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<LearnRequest>();
        let worker = tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let store = Arc::clone(&store);
                let saved = tokio::task::spawn_blocking(move || {
                    store.save_interaction(&request.query, request.interaction)
                })
                .await;
                match saved {
                    Ok(Ok(true)) => tracing::debug!("interaction learned"),
                    Ok(Ok(false)) => tracing::debug!("interaction already known"),
                    Ok(Err(err)) => tracing::error!(error = %err, "failed to learn interaction"),
                    Err(err) => tracing::error!(error = %err, "learning task panicked"),
                }
            }
            tracing::debug!("knowledge learner stopped");
        });
        Self { tx, worker }
    }

    /// Queue a live answer for learning.
    ///
    /// Only responses served by live providers are learned; fallback
    /// responses would just echo stored or static data back into the store.
    /// Returns `true` if the interaction was queued.
    pub fn record(&self, query: &str, answer: impl Into<String>, response: &SearchResponse) -> bool {
        if !response.provenance.is_live() || response.results.is_empty() {
            tracing::debug!(provenance = %response.provenance, "not learning fallback response");
            return false;
        }
        self.submit(
            query,
            Interaction {
                answer: answer.into(),
                sources: response.results.clone(),
                images: response.images.clone(),
            },
        )
    }

    /// Queue an arbitrary interaction. Returns `false` if the worker is gone.
    pub fn submit(&self, query: &str, interaction: Interaction) -> bool {
        let request = LearnRequest {
            query: query.to_owned(),
            interaction,
        };
        match self.tx.send(request) {
            Ok(()) => true,
            Err(_) => {
                tracing::error!("knowledge learner is not running; interaction dropped");
                false
            }
        }
    }

    /// Stop accepting work and wait for every queued save to finish.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(err) = self.worker.await {
            tracing::error!(error = %err, "knowledge learner terminated abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Provenance, ProviderKind, SearchResult};

    fn response(provenance: Provenance) -> SearchResponse {
        let mut result = SearchResult::new("감기 예방", "https://kdca.go.kr", "손 씻기");
        result.engine = Some(ProviderKind::Tavily);
        SearchResponse {
            results: vec![result],
            images: vec!["https://img.kr/a.jpg".into()],
            provenance,
        }
    }

    fn temp_store() -> (tempfile::TempDir, Arc<KnowledgeStore>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = KnowledgeStore::open(dir.path().join("kb.json"), 15.0).expect("open");
        (dir, Arc::new(store))
    }

    #[tokio::test]
    async fn live_response_is_learned_after_shutdown() {
        let (_dir, store) = temp_store();
        let learner = KnowledgeLearner::spawn(Arc::clone(&store));

        assert!(learner.record("감기 예방법", "손을 자주 씻으세요", &response(Provenance::HybridAggregation)));
        learner.shutdown().await;

        let entries = store.load().expect("load");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].answer, "손을 자주 씻으세요");
        assert_eq!(entries[0].images.len(), 1);
    }

    #[tokio::test]
    async fn fallback_responses_are_not_learned() {
        let (_dir, store) = temp_store();
        let learner = KnowledgeLearner::spawn(Arc::clone(&store));

        assert!(!learner.record("감기", "a", &response(Provenance::Mock)));
        assert!(!learner.record("감기", "a", &response(Provenance::KnowledgeBase)));
        learner.shutdown().await;

        assert!(store.load().expect("load").is_empty());
    }

    #[tokio::test]
    async fn overlapping_submissions_are_all_persisted() {
        let (_dir, store) = temp_store();
        let learner = KnowledgeLearner::spawn(Arc::clone(&store));

        for i in 0..20 {
            learner.submit(&format!("질문 {i}"), Interaction::default());
        }
        learner.shutdown().await;

        assert_eq!(store.load().expect("load").len(), 20);
    }
}

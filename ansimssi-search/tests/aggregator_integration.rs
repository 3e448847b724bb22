//! Integration tests for the aggregator race, merge and fallback chain.
//!
//! Providers are in-process stubs with scripted delays; timing tests run on
//! a paused Tokio clock so phase deadlines are exact and no test sleeps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ansimssi_search::{
    Aggregator, Interaction, KnowledgeStore, Provenance, ProviderAdapter, ProviderKind,
    ProviderOutcome, ProviderRegistry, SearchConfig, SearchError, SearchResult,
};
use async_trait::async_trait;
use tokio::time::Instant;

struct StubProvider {
    kind: ProviderKind,
    urls: Vec<String>,
    images: Vec<String>,
    delay: Duration,
    fail: bool,
    finished: Arc<AtomicBool>,
}

impl StubProvider {
    fn new(kind: ProviderKind, urls: &[&str], delay_ms: u64) -> Self {
        Self {
            kind,
            urls: urls.iter().map(|u| (*u).to_owned()).collect(),
            images: vec![],
            delay: Duration::from_millis(delay_ms),
            fail: false,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    fn failing(kind: ProviderKind, delay_ms: u64) -> Self {
        Self {
            fail: true,
            ..Self::new(kind, &[], delay_ms)
        }
    }

    fn with_images(mut self, images: &[&str]) -> Self {
        self.images = images.iter().map(|i| (*i).to_owned()).collect();
        self
    }
}

#[async_trait]
impl ProviderAdapter for StubProvider {
    async fn search(&self, _query: &str) -> Result<ProviderOutcome, SearchError> {
        tokio::time::sleep(self.delay).await;
        self.finished.store(true, Ordering::SeqCst);
        if self.fail {
            return Err(SearchError::Http("stub failure".into()));
        }
        Ok(ProviderOutcome {
            engine: self.kind,
            results: self
                .urls
                .iter()
                .map(|u| SearchResult::new(format!("{} {u}", self.kind), u.clone(), "snippet"))
                .collect(),
            images: self.images.clone(),
        })
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }
}

/// Never completes, even past its own timeout.
struct SilentProvider;

#[async_trait]
impl ProviderAdapter for SilentProvider {
    async fn search(&self, _query: &str) -> Result<ProviderOutcome, SearchError> {
        std::future::pending().await
    }

    async fn query(&self, _query: &str, _timeout: Duration) -> Option<ProviderOutcome> {
        std::future::pending().await
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Exa
    }
}

fn urls(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("https://{prefix}.kr/{i}")).collect()
}

fn aggregator(providers: Vec<StubProvider>) -> Aggregator {
    let registry = providers
        .into_iter()
        .fold(ProviderRegistry::new(), |registry, p| registry.with(p));
    Aggregator::new(registry, SearchConfig::default()).expect("aggregator")
}

fn temp_store(dir: &tempfile::TempDir) -> Arc<KnowledgeStore> {
    Arc::new(KnowledgeStore::open(dir.path().join("knowledge.json"), 15.0).expect("open store"))
}

#[tokio::test(start_paused = true)]
async fn duplicate_urls_merge_first_seen_wins() {
    let aggregator = aggregator(vec![
        StubProvider::new(ProviderKind::Tavily, &["https://a.kr", "https://b.kr"], 100),
        StubProvider::new(ProviderKind::Google, &["https://b.kr", "https://c.kr"], 300),
        StubProvider::new(ProviderKind::Exa, &["https://a.kr", "https://d.kr"], 500),
    ]);

    let response = aggregator.search("당뇨 초기 증상").await.expect("search");

    let got: Vec<&str> = response.results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(got, vec!["https://a.kr", "https://b.kr", "https://c.kr", "https://d.kr"]);
    assert_eq!(response.results[1].engine, Some(ProviderKind::Tavily));
    assert_eq!(response.results[2].engine, Some(ProviderKind::Google));
    assert_eq!(response.provenance, Provenance::HybridAggregation);
}

#[tokio::test(start_paused = true)]
async fn merge_follows_completion_order_not_registration_order() {
    let aggregator = aggregator(vec![
        StubProvider::new(ProviderKind::Google, &["https://shared.kr", "https://g.kr"], 800),
        StubProvider::new(ProviderKind::Exa, &["https://shared.kr", "https://e.kr"], 200),
    ]);

    let response = aggregator.search("고혈압").await.expect("search");
    assert_eq!(response.results[0].url, "https://shared.kr");
    assert_eq!(response.results[0].engine, Some(ProviderKind::Exa));
}

#[tokio::test(start_paused = true)]
async fn rich_first_phase_returns_without_escalation() {
    let slow = StubProvider::new(ProviderKind::Exa, &["https://late.kr"], 3_000);
    let slow_finished = Arc::clone(&slow.finished);
    let fast = urls("fast", 5);
    let fast: Vec<&str> = fast.iter().map(String::as_str).collect();
    let aggregator = aggregator(vec![StubProvider::new(ProviderKind::Tavily, &fast, 500), slow]);

    let started = Instant::now();
    let response = aggregator.search("보건소 진료 시간").await.expect("search");
    let elapsed = started.elapsed();

    assert!(elapsed <= Duration::from_millis(2_000), "took {elapsed:?}");
    assert_eq!(response.results.len(), 5);
    assert!(response.results.iter().all(|r| r.url != "https://late.kr"));
    assert_eq!(response.provenance, Provenance::Engine(ProviderKind::Tavily));

    // The straggler was aborted: advancing past its delay never completes it.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!slow_finished.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn all_fast_providers_return_before_first_deadline() {
    let aggregator = aggregator(vec![
        StubProvider::new(ProviderKind::Tavily, &["https://a.kr"], 100),
        StubProvider::new(ProviderKind::Google, &["https://b.kr"], 150),
    ]);

    let started = Instant::now();
    let response = aggregator.search("감기").await.expect("search");

    assert!(started.elapsed() < Duration::from_millis(200));
    assert_eq!(response.results.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn low_yield_escalates_and_includes_second_phase_results() {
    let late = urls("late", 4);
    let late: Vec<&str> = late.iter().map(String::as_str).collect();
    let aggregator = aggregator(vec![
        StubProvider::new(ProviderKind::Tavily, &["https://early.kr"], 500),
        StubProvider::new(ProviderKind::Exa, &late, 3_000),
    ]);

    let started = Instant::now();
    let response = aggregator.search("대상포진 예방접종").await.expect("search");
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(2_000), "took {elapsed:?}");
    assert!(elapsed <= Duration::from_millis(4_000), "took {elapsed:?}");
    assert_eq!(response.results.len(), 5);
    assert_eq!(response.results[0].url, "https://early.kr");
    assert!(response.results.iter().any(|r| r.url == "https://late.kr/3"));
    assert_eq!(response.provenance, Provenance::HybridAggregation);
}

#[tokio::test(start_paused = true)]
async fn results_after_total_deadline_are_discarded() {
    let config = SearchConfig {
        provider_timeout_ms: 4_000,
        ..Default::default()
    };
    let straggler = StubProvider::new(ProviderKind::Google, &["https://never.kr"], 3_900);
    let registry = ProviderRegistry::new()
        .with(StubProvider::new(ProviderKind::Tavily, &["https://only.kr"], 100))
        .with(StubProvider {
            delay: Duration::from_millis(6_000),
            ..StubProvider::new(ProviderKind::Exa, &["https://too-late.kr"], 0)
        })
        .with(straggler);
    let aggregator = Aggregator::new(registry, config).expect("aggregator");

    let response = aggregator.search("금연 클리닉").await.expect("search");

    let got: Vec<&str> = response.results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(got, vec!["https://only.kr", "https://never.kr"]);
    assert!(!got.contains(&"https://too-late.kr"));
}

#[tokio::test(start_paused = true)]
async fn failures_are_not_fatal() {
    let aggregator = aggregator(vec![
        StubProvider::failing(ProviderKind::Google, 50),
        StubProvider::new(ProviderKind::Tavily, &["https://ok.kr"], 100),
        StubProvider::failing(ProviderKind::Exa, 150),
    ]);

    let response = aggregator.search("독감").await.expect("search");
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.provenance, Provenance::Engine(ProviderKind::Tavily));
}

#[tokio::test(start_paused = true)]
async fn images_are_merged_and_deduplicated() {
    let aggregator = aggregator(vec![
        StubProvider::new(ProviderKind::Tavily, &["https://a.kr"], 100)
            .with_images(&["https://img.kr/1.jpg", "https://img.kr/2.jpg"]),
        StubProvider::new(ProviderKind::Google, &["https://b.kr"], 200)
            .with_images(&["https://img.kr/2.jpg"]),
    ]);

    let response = aggregator.search("당뇨 식단").await.expect("search");
    assert_eq!(response.images, vec!["https://img.kr/1.jpg", "https://img.kr/2.jpg"]);
}

#[tokio::test(start_paused = true)]
async fn results_are_truncated_to_max() {
    let many = urls("many", 20);
    let many: Vec<&str> = many.iter().map(String::as_str).collect();
    let aggregator = aggregator(vec![StubProvider::new(ProviderKind::Google, &many, 100)]);

    let response = aggregator.search("비만").await.expect("search");
    assert_eq!(response.results.len(), 12);
    assert_eq!(response.results[0].url, "https://many.kr/0");
}

#[tokio::test(start_paused = true)]
async fn silent_provider_is_cut_off_at_total_deadline() {
    let config = SearchConfig::default();
    let deadline = config.phase_one_wait() + config.phase_two_wait();
    let registry = ProviderRegistry::new()
        .with(StubProvider::new(ProviderKind::Tavily, &["https://fast.kr"], 100))
        .with(SilentProvider);
    let aggregator = Aggregator::new(registry, config).expect("aggregator");

    let start = Instant::now();
    let response = aggregator.search("독감 예방접종").await.expect("search");
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed <= deadline);
    let urls: Vec<&str> = response.results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://fast.kr"]);
    assert_eq!(response.provenance, Provenance::Engine(ProviderKind::Tavily));
}

#[tokio::test(start_paused = true)]
async fn only_silent_provider_falls_back_within_deadline() {
    let config = SearchConfig::default();
    let deadline = config.phase_one_wait() + config.phase_two_wait();
    let registry = ProviderRegistry::new().with(SilentProvider);
    let aggregator = Aggregator::new(registry, config).expect("aggregator");

    let start = Instant::now();
    let response = aggregator.search("보건소").await.expect("search");

    assert!(start.elapsed() <= deadline);
    assert_eq!(response.provenance, Provenance::Mock);
    assert!(response.results.iter().all(|r| r.engine != Some(ProviderKind::Exa)));
}

#[tokio::test]
async fn blank_query_is_invalid() {
    let aggregator = aggregator(vec![StubProvider::new(ProviderKind::Google, &["https://a.kr"], 0)]);
    let err = aggregator.search(" \t ").await.expect_err("blank query");
    assert!(matches!(err, SearchError::InvalidQuery(_)));
}

#[tokio::test(start_paused = true)]
async fn single_engine_answer_names_that_engine() {
    let aggregator = aggregator(vec![
        StubProvider::new(
            ProviderKind::Google,
            &["https://g1.kr", "https://g2.kr", "https://g3.kr", "https://g4.kr"],
            300,
        ),
        StubProvider::failing(ProviderKind::Tavily, 100),
    ]);

    let response = aggregator.search("보건소 예방접종").await.expect("search");
    assert_eq!(response.provenance, Provenance::Engine(ProviderKind::Google));
    assert!(response.provenance.is_live());
}

#[tokio::test(start_paused = true)]
async fn all_providers_fail_serves_catalog_topic() {
    let aggregator = aggregator(vec![
        StubProvider::failing(ProviderKind::Google, 100),
        StubProvider::failing(ProviderKind::Tavily, 100),
    ]);

    let response = aggregator.search("보건소").await.expect("search");
    assert_eq!(response.provenance, Provenance::Mock);
    assert_eq!(response.results[0].url, "https://www.g-health.kr/portal/index.do");
    assert!(!response.images.is_empty());
}

#[tokio::test(start_paused = true)]
async fn knowledge_base_answers_when_providers_are_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = temp_store(&dir);
    let mut learned = SearchResult::new("당뇨병 초기증상", "https://www.amc.seoul.kr/diabetes", "갈증");
    learned.engine = Some(ProviderKind::Tavily);
    store
        .save_interaction(
            "당뇨 초기 증상",
            Interaction {
                answer: "다뇨, 다음, 다식".into(),
                sources: vec![learned.clone()],
                images: vec!["https://img.kr/d.jpg".into()],
            },
        )
        .expect("save");

    let aggregator = aggregator(vec![StubProvider::new(ProviderKind::Google, &[], 100)])
        .with_knowledge(Arc::clone(&store));

    let response = aggregator.search("당뇨 증상 알려줘").await.expect("search");
    assert_eq!(response.provenance, Provenance::KnowledgeBase);
    assert_eq!(response.results, vec![learned]);
    assert_eq!(response.images, vec!["https://img.kr/d.jpg"]);
}

#[tokio::test(start_paused = true)]
async fn knowledge_base_answers_when_all_providers_fail() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = temp_store(&dir);
    let learned = SearchResult::new("고혈압 식단 가이드", "https://www.kdca.go.kr/bp", "저염식");
    store
        .save_interaction(
            "고혈압 식단",
            Interaction {
                answer: "하루 소금 5g 이하".into(),
                sources: vec![learned.clone()],
                images: vec![],
            },
        )
        .expect("save");

    let aggregator = aggregator(vec![
        StubProvider::failing(ProviderKind::Google, 100),
        StubProvider::failing(ProviderKind::Tavily, 200),
        StubProvider::failing(ProviderKind::Exa, 300),
    ])
    .with_knowledge(store);

    let response = aggregator.search("고혈압 식단").await.expect("search");
    assert_eq!(response.provenance, Provenance::KnowledgeBase);
    assert_eq!(response.results, vec![learned]);
}

#[tokio::test(start_paused = true)]
async fn unknown_topic_gets_search_links() {
    let dir = tempfile::tempdir().expect("tempdir");
    let aggregator = aggregator(vec![StubProvider::failing(ProviderKind::Exa, 100)])
        .with_knowledge(temp_store(&dir));

    let response = aggregator.search("무릎 통증 운동").await.expect("search");
    assert_eq!(response.provenance, Provenance::Mock);
    assert_eq!(response.results.len(), 3);
    assert!(response.results.iter().all(|r| r.title.contains("무릎 통증 운동")));
    assert!(response.images.is_empty());
}

#[tokio::test(start_paused = true)]
async fn unrelated_knowledge_is_not_served() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = temp_store(&dir);
    store
        .save_interaction(
            "당뇨 초기 증상",
            Interaction {
                answer: "a".into(),
                sources: vec![SearchResult::new("t", "https://a.kr", "")],
                images: vec![],
            },
        )
        .expect("save");

    let aggregator = aggregator(vec![]).with_knowledge(store);
    let response = aggregator.search("감기").await.expect("search");
    assert_eq!(response.provenance, Provenance::Mock);
}

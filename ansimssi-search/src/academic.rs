//! Intent-routed academic and institutional document search.
//!
//! Unlike the aggregator this issues exactly one provider call. The query
//! is classified as government/statistics, clinical/hospital or general
//! scholarly material, and each intent gets its own SerpApi query template.
//! Any failure, or an empty answer, degrades to a fixed set of verified
//! reference documents.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;

use crate::error::SearchError;
use crate::providers::serpapi::{OrganicResult, SerpApiClient};
use crate::types::AcademicPaper;

/// Results requested from the single academic call.
const ACADEMIC_RESULTS: usize = 6;

/// Earliest publication year requested from Google Scholar.
const SCHOLAR_SINCE_YEAR: &str = "2020";

const GOVERNMENT_KEYWORDS: &[&str] = &[
    "통계", "현황", "정책", "가이드라인", "지침", "법령", "보건소", "질병관리청", "stats", "policy",
    "guideline",
];

const CLINICAL_KEYWORDS: &[&str] = &[
    "증상", "치료법", "수술", "식이요법", "좋은 음식", "피해야", "symptom", "treatment", "died",
];

/// What kind of document a query is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcademicIntent {
    /// Policy and statistics: Korean government and public-agency PDFs.
    Government,
    /// Patient information: major hospitals and the disease control agency.
    Clinical,
    /// Everything else: Google Scholar papers.
    Scholarly,
}

impl AcademicIntent {
    /// SerpApi engine used for this intent.
    pub fn engine(&self) -> &'static str {
        match self {
            Self::Government | Self::Clinical => "google",
            Self::Scholarly => "google_scholar",
        }
    }
}

/// A routed academic query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcademicPlan {
    pub intent: AcademicIntent,
    /// The templated query text sent to the provider.
    pub query: String,
}

/// Classify `query`. Government keywords take precedence over clinical ones.
pub fn classify(query: &str) -> AcademicIntent {
    let lowered = query.to_lowercase();
    if GOVERNMENT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        AcademicIntent::Government
    } else if CLINICAL_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        AcademicIntent::Clinical
    } else {
        AcademicIntent::Scholarly
    }
}

/// Classify `query` and build its templated provider query.
pub fn plan(query: &str) -> AcademicPlan {
    let intent = classify(query);
    let query = match intent {
        AcademicIntent::Government => format!("{query} site:go.kr OR site:or.kr filetype:pdf"),
        AcademicIntent::Clinical => format!(
            "{query} site:snuh.org OR site:amc.seoul.kr OR site:samsunghospital.com OR site:kdca.go.kr filetype:pdf"
        ),
        AcademicIntent::Scholarly => format!("{query} filetype:pdf"),
    };
    AcademicPlan { intent, query }
}

/// A backend able to answer one routed academic query.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Fetch documents for `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on transport or decode failure.
    async fn fetch(&self, plan: &AcademicPlan) -> Result<Vec<AcademicPaper>, SearchError>;
}

#[async_trait]
impl PaperSource for SerpApiClient {
    async fn fetch(&self, plan: &AcademicPlan) -> Result<Vec<AcademicPaper>, SearchError> {
        let mut params = vec![
            ("engine", plan.intent.engine().to_owned()),
            ("q", plan.query.clone()),
            ("num", ACADEMIC_RESULTS.to_string()),
            ("hl", "ko".to_owned()),
        ];
        match plan.intent {
            AcademicIntent::Scholarly => params.push(("as_ylo", SCHOLAR_SINCE_YEAR.to_owned())),
            AcademicIntent::Government | AcademicIntent::Clinical => {
                params.push(("gl", "kr".to_owned()))
            }
        }
        let body = SerpApiClient::fetch(self, &params).await?;
        Ok(parse_papers(plan.intent, body.organic_results))
    }
}

/// Routes academic queries to a single source with a static fallback.
#[derive(Clone, Default)]
pub struct AcademicRouter {
    source: Option<Arc<dyn PaperSource>>,
}

impl std::fmt::Debug for AcademicRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcademicRouter")
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

impl AcademicRouter {
    /// Router backed by `source`.
    pub fn new(source: impl PaperSource + 'static) -> Self {
        Self {
            source: Some(Arc::new(source)),
        }
    }

    /// Router with no live source; always serves the reference set.
    pub fn offline() -> Self {
        Self::default()
    }

    /// Find documents for `query`.
    ///
    /// Never fails: errors and empty answers fall back to
    /// [`reference_papers`].
    pub async fn search(&self, query: &str) -> Vec<AcademicPaper> {
        let query = query.trim();
        if query.is_empty() {
            return reference_papers();
        }
        let plan = plan(query);
        tracing::debug!(intent = ?plan.intent, "academic query routed");

        let papers = match &self.source {
            Some(source) => match source.fetch(&plan).await {
                Ok(papers) => papers,
                Err(err) => {
                    tracing::warn!(error = %err, "academic search failed");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        if papers.is_empty() {
            tracing::info!("serving reference papers");
            return reference_papers();
        }
        papers
    }
}

/// Map organic results to papers.
///
/// Scholar entries prefer an attached PDF resource over the landing page.
fn parse_papers(intent: AcademicIntent, organic: Vec<OrganicResult>) -> Vec<AcademicPaper> {
    organic
        .into_iter()
        .filter_map(|item| {
            let pdf = match intent {
                AcademicIntent::Scholarly => item
                    .resources
                    .iter()
                    .filter_map(|r| r.link.as_deref())
                    .find(|link| link.to_lowercase().ends_with(".pdf"))
                    .map(str::to_owned),
                AcademicIntent::Government | AcademicIntent::Clinical => None,
            };
            let link = pdf
                .or(item.link)
                .map(|l| l.trim().to_owned())
                .filter(|l| !l.is_empty())?;

            let snippet = item.snippet.unwrap_or_default();
            let publication_info = item
                .publication_info
                .and_then(|p| p.summary)
                .filter(|s| !s.trim().is_empty())
                .or(item.displayed_link)
                .unwrap_or_else(|| "Source".to_owned());
            let year = extract_year(&format!("{snippet} {publication_info}"));

            Some(AcademicPaper {
                title: item.title.unwrap_or_else(|| "Untitled document".to_owned()),
                link,
                snippet,
                publication_info,
                year,
            })
        })
        .collect()
}

fn year_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?:^|\D)(20\d{2})(?:\D|$)").ok())
        .as_ref()
}

/// First standalone four-digit year starting with `20`, or an empty string.
///
/// Digits glued to other digits do not count; Korean suffixes such as
/// `2023년` do.
pub fn extract_year(text: &str) -> String {
    year_pattern()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
        .unwrap_or_default()
}

/// Verified reference documents served when live search yields nothing.
pub fn reference_papers() -> Vec<AcademicPaper> {
    vec![
        AcademicPaper {
            title: "2023 당뇨병 진료지침 (제8판) - 대한당뇨병학회".into(),
            link: "https://www.diabetes.or.kr/pro/news/admin/assets/standard_2023.pdf".into(),
            snippet: "대한당뇨병학회에서 발간한 2023년 최신 진료지침 요약본입니다. 한국인 환자에 최적화된 약물 치료 및 생활 습관 가이드라인을 포함합니다.".into(),
            publication_info: "대한당뇨병학회 (KDA) - 2023".into(),
            year: "2023".into(),
        },
        AcademicPaper {
            title: "국가 건강검진 및 만성질환 관리 통계 연보".into(),
            link: "https://www.nhis.or.kr/nhis/healthin/wbdc/wbdc0600.do?mode=download&articleNo=108398&attachNo=323719".into(),
            snippet: "국민건강보험공단이 발행한 최신 만성질환 현황 통계입니다. 고혈압, 당뇨병 유병률 및 관리 실태를 확인할 수 있습니다.".into(),
            publication_info: "국민건강보험공단 - 2024".into(),
            year: "2024".into(),
        },
        AcademicPaper {
            title: "고혈압 진료지침 2022 - 대한고혈압학회".into(),
            link: "https://koreanhypertension.org/assets/guideline/2022_Hypertension_Guideline_K.pdf".into(),
            snippet: "일차 의료기관 의사를 위한 고혈압 진료 가이드라인. 진단 기준 및 목표 혈압 설정에 대한 근거 중심의 권고안입니다.".into(),
            publication_info: "대한고혈압학회 - 2022".into(),
            year: "2022".into(),
        },
    ]
}

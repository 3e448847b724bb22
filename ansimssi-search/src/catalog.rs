//! Static, keyword-routed result sets: the last fallback tier.
//!
//! Topics are tested in table order and the first whose keywords appear in
//! the query wins. Korean keywords match the raw query, English keywords
//! the lowercased query. Anything else gets deep links into general search
//! engines for the literal query text.

use url::Url;

use crate::types::{ImageRef, SearchResult};

struct Topic {
    keywords: &'static [&'static str],
    results: &'static [(&'static str, &'static str, &'static str)],
    images: &'static [&'static str],
}

const TOPICS: &[Topic] = &[
    Topic {
        keywords: &["보건소", "health center"],
        results: &[
            ("보건소 이용안내 - G-Health 공공보건포털", "https://www.g-health.kr/portal/index.do", "전국 보건소 찾기 및 진료 시간 안내. 내과, 치과, 한방 진료 등 보건소에서 제공하는 다양한 의료 서비스를 확인하세요."),
            ("보건소 - 찾기/안내/예약 - 서울특별시", "https://health.seoul.go.kr", "서울시 내 25개 자치구 보건소 위치 및 연락처 정보. 예방접종, 대사증후군 관리 등 시민 건강 서비스 안내."),
            ("동네 의원과 보건소, 무엇이 다를까? - 헬스조선", "https://m.health.chosun.com", "보건소는 국가에서 운영하는 공공 의료기관으로, 일반 병의원보다 저렴한 비용으로 진료 및 예방접종이 가능합니다."),
            ("보건소 모바일 헬스케어 - 한국건강증진개발원", "https://www.khealth.or.kr", "스마트폰을 활용한 맞춤형 건강관리 서비스. 보건소 전문가가 비대면으로 건강상담 및 정보를 제공합니다."),
        ],
        images: &[
            "https://news.seoul.go.kr/welfare/files/2020/02/602ff579e0a01.jpg",
            "https://www.korea.kr/newsWeb/resources/attaches/2021.05/20/094e9f735870ad46b412953258849646.jpg",
            "https://t1.daumcdn.net/cfile/tistory/99857B3359D8878D32",
            "https://www.yongin.go.kr/resources/images/hist/content/img_hist_2020_04_01.jpg",
        ],
    },
    Topic {
        keywords: &["당뇨", "diabetes"],
        results: &[
            ("당뇨병의 증상과 진단 - 대한당뇨병학회", "https://www.diabetes.or.kr", "대표적인 증상은 다뇨, 다음, 다식입니다. 이유 없는 체중 감소나 피로감도 나타날 수 있습니다."),
            ("당뇨병 초기증상 5가지 - 서울아산병원", "https://www.amc.seoul.kr", "1. 잦은 소변 2. 심한 갈증 3. 배고픔 4. 체중 감소 5. 시야 흐림. 조기 발견이 합병증 예방의 핵심입니다."),
            ("당뇨병 관리 가이드 - 질병관리청", "https://health.kdca.go.kr", "약물 요법 뿐만 아니라 식이요법과 운동요법이 병행되어야 혈당을 효과적으로 관리할 수 있습니다."),
        ],
        images: &[
            "https://www.amc.seoul.kr/asan/images/healthinfo/disease/disease_img_01.jpg",
            "https://health.kdca.go.kr/healthinfo/biz/health/file/fileDownload.do?atchFileId=FILE_000000000000123&fileSn=1",
        ],
    },
    Topic {
        keywords: &["고혈압", "hypertension"],
        results: &[
            ("고혈압의 진단과 치료 - 질병관리청 국가건강정보포털", "https://health.kdca.go.kr", "고혈압은 침묵의 살인자로 불리며, 뇌졸중 및 심혈관 질환의 주요 원인입니다. 정기적인 혈압 측정과 생활 습관 개선이 필수적입니다."),
            ("대한고혈압학회 - 일반인/환자를 위한 정보", "https://www.koreanhypertension.org", "올바른 혈압 측정법, 고혈압 약물 복용 가이드, 식단 관리 등 고혈압 환자를 위한 전문적인 정보를 제공합니다."),
            ("고혈압 낮추는 방법 5가지 - 삼성서울병원 건강칼럼", "http://www.samsunghospital.com", "1. 체중 감량 2. 식단 조절(저염식) 3. 규칙적인 운동 4. 금연 5. 스트레스 관리"),
            ("고혈압, 약 평생 먹어야 하나요?", "https://www.hidoc.co.kr", "생활 습관 개선으로 혈압이 조절되면 약을 줄이거나 끊을 수 있습니다."),
        ],
        images: &[
            "https://i.ytimg.com/vi/Ofg98y0d_E4/maxresdefault.jpg",
            "http://www.samsunghospital.com/upload/editor/20200518_1.jpg",
        ],
    },
    Topic {
        keywords: &["감기", "cold"],
        results: &[
            ("감기와 독감의 차이점 - 질병관리청", "https://kdca.go.kr", "감기는 바이러스 감염에 의한 상기도 감염이며, 독감은 인플루엔자 바이러스에 의한 급성 호흡기 질환입니다."),
            ("감기 빨리 낫는 법 10가지", "https://www.healthline.com", "충분한 수분 섭취, 휴식, 가습기 사용, 따뜻한 차 마시기 등이 도움이 됩니다."),
            ("약 먹어도 감기가 안 낫는 이유", "https://www.youtube.com/watch?v=example", "감기약은 증상을 완화할 뿐 바이러스를 치료하지 않습니다. 면역력이 중요합니다."),
        ],
        images: &[
            "https://img.freepik.com/free-photo/sick-woman-blowing-her-nose_23-2147743128.jpg",
            "https://images.unsplash.com/photo-1513201099718-4ed89549448f?auto=format&fit=crop&w=1000&q=80",
        ],
    },
];

/// Deep-link templates for the generic stub: (title suffix, base url, query key, description).
const SEARCH_LINKS: &[(&str, &str, &str, &str)] = &[
    ("Google 검색", "https://www.google.com/search", "q", "Google에서 검색 결과를 확인하세요."),
    ("네이버 검색", "https://search.naver.com/search.naver", "query", "네이버에서 관련 정보를 확인하세요."),
    ("YouTube 검색", "https://www.youtube.com/results", "search_query", "관련 영상을 YouTube에서 찾아보세요."),
];

/// Deterministic last-resort catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockCatalog;

impl MockCatalog {
    /// Create the catalog.
    pub fn new() -> Self {
        Self
    }

    /// Canned results and images for `query`.
    ///
    /// Never fails and never returns an empty result list for a non-blank
    /// query.
    pub fn lookup(&self, query: &str) -> (Vec<SearchResult>, Vec<ImageRef>) {
        let lowered = query.to_lowercase();
        let topic = TOPICS.iter().find(|topic| {
            topic
                .keywords
                .iter()
                .any(|k| query.contains(k) || lowered.contains(k))
        });

        match topic {
            Some(topic) => {
                tracing::debug!(keyword = topic.keywords[0], "catalog topic matched");
                let results = topic
                    .results
                    .iter()
                    .map(|(title, url, content)| SearchResult::new(*title, *url, *content))
                    .collect();
                let images = topic.images.iter().map(|s| (*s).to_owned()).collect();
                (results, images)
            }
            None => (search_links(query), Vec::new()),
        }
    }
}

fn search_links(query: &str) -> Vec<SearchResult> {
    SEARCH_LINKS
        .iter()
        .filter_map(|(label, base, key, description)| {
            let url = Url::parse_with_params(base, &[(*key, query)]).ok()?;
            Some(SearchResult::new(
                format!("'{query}' - {label}"),
                url.to_string(),
                *description,
            ))
        })
        .collect()
}

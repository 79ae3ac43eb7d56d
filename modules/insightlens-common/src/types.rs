use serde::{Deserialize, Serialize};

// --- Source tags ---

/// Fixed tag identifying which adapter produced an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTag {
    NewsSearch,
    EventIndex,
    SocialFeed,
    RssFeed,
    VideoPlatform,
    VideoSearch,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::NewsSearch => "news-search",
            SourceTag::EventIndex => "event-index",
            SourceTag::SocialFeed => "social-feed",
            SourceTag::RssFeed => "rss-feed",
            SourceTag::VideoPlatform => "video-platform",
            SourceTag::VideoSearch => "video-search",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "news-search" => Ok(SourceTag::NewsSearch),
            "event-index" => Ok(SourceTag::EventIndex),
            "social-feed" => Ok(SourceTag::SocialFeed),
            "rss-feed" => Ok(SourceTag::RssFeed),
            "video-platform" => Ok(SourceTag::VideoPlatform),
            "video-search" => Ok(SourceTag::VideoSearch),
            other => Err(format!("unknown source tag: {other}")),
        }
    }
}

// --- Canonical records ---

/// An insight as produced by a source adapter, before persistence.
/// All fields are plain strings; missing upstream values become empty
/// strings rather than options so every record has the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInsight {
    pub source: SourceTag,
    pub title: String,
    pub url: String,
    pub content: String,
    /// RFC-3339 timestamp, or empty when the upstream did not provide one.
    pub published_at: String,
}

impl NewInsight {
    /// Promote to the response-record shape without going through the
    /// store: no surrogate id, no insertion timestamp. Search responses
    /// carry freshly-fetched records in this form alongside stored rows.
    pub fn into_record(self) -> Insight {
        Insight {
            id: None,
            source: self.source,
            title: self.title,
            url: self.url,
            content: self.content,
            published_at: self.published_at,
            inserted_at: String::new(),
        }
    }
}

/// An insight as surfaced by search. Rows coming out of the store carry
/// the surrogate `id` and `inserted_at` the store assigned at write time;
/// freshly-fetched records that have not visibly been through the store
/// carry neither. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub id: Option<i64>,
    pub source: SourceTag,
    pub title: String,
    pub url: String,
    pub content: String,
    pub published_at: String,
    pub inserted_at: String,
}

// --- Summaries ---

/// Synthesis over one search's result set. Ephemeral: recomputed per
/// request, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub text: String,
    pub bullets: Vec<String>,
    pub recommendations: Vec<String>,
    pub citations: Vec<String>,
}

impl SummaryResult {
    /// A result carrying only an explanatory message, all lists empty.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

// --- Search request/response ---

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub keyword: String,
    pub source: Option<SourceTag>,
    pub limit: u32,
    pub offset: u32,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl SearchRequest {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            source: None,
            limit: 20,
            offset: 0,
            start_date: None,
            end_date: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub records: Vec<Insight>,
    pub summary: SummaryResult,
}

// GDELT DOC 2.0 adapter. Keyless, but the endpoint throttles aggressively,
// so this is the one adapter with a bounded retry on 429.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use insightlens_common::{NewInsight, SourceTag};

use crate::error::{AdapterError, Result};
use crate::retry::with_rate_limit_retry;
use crate::traits::SourceAdapter;

const GDELT_DOC_URL: &str = "https://api.gdeltproject.org/api/v2/doc/doc";
const DEFAULT_QUERY: &str = "market OR finance OR technology";

pub struct GdeltAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl GdeltAdapter {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build GDELT HTTP client");
        Self {
            client,
            base_url: GDELT_DOC_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    async fn fetch_once(&self, query: &str, limit: u32) -> Result<Vec<NewInsight>> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("query", query), ("format", "json"), ("sort", "DateDesc")])
            .query(&[("maxrecords", limit.to_string())])
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AdapterError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AdapterError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: GdeltResponse = resp.json().await?;
        debug!(count = data.articles.len(), "GDELT articles fetched");

        Ok(data
            .articles
            .into_iter()
            .map(GdeltArticle::into_insight)
            .collect())
    }
}

impl Default for GdeltAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct GdeltResponse {
    #[serde(default)]
    articles: Vec<GdeltArticle>,
}

/// One document from the GDELT DOC API.
#[derive(Debug, Deserialize)]
struct GdeltArticle {
    title: Option<String>,
    url: Option<String>,
    seendate: Option<String>,
    language: Option<String>,
}

impl GdeltArticle {
    fn into_insight(self) -> NewInsight {
        let seendate = self.seendate.unwrap_or_default();
        let language = self.language.unwrap_or_default();
        NewInsight {
            source: SourceTag::EventIndex,
            title: self.title.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            // GDELT has no article body; synthesize one from the metadata
            // it does carry so the record is still searchable.
            content: format!("{seendate} | {language}"),
            published_at: normalize_seendate(&seendate),
        }
    }
}

/// GDELT emits compact `YYYYMMDDTHHMMSSZ` timestamps. Normalize to
/// RFC-3339; anything that does not parse becomes the empty string.
fn normalize_seendate(raw: &str) -> String {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%SZ")
        .map(|dt| format!("{}Z", dt.format("%Y-%m-%dT%H:%M:%S")))
        .unwrap_or_default()
}

#[async_trait]
impl SourceAdapter for GdeltAdapter {
    fn source(&self) -> SourceTag {
        SourceTag::EventIndex
    }

    async fn fetch(&self, topic: Option<&str>, limit: u32) -> Result<Vec<NewInsight>> {
        let query = topic.unwrap_or(DEFAULT_QUERY);
        with_rate_limit_retry("gdelt", || self.fetch_once(query, limit)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seendate_normalizes_to_rfc3339() {
        assert_eq!(normalize_seendate("20240510T134500Z"), "2024-05-10T13:45:00Z");
    }

    #[test]
    fn unparseable_seendate_becomes_empty() {
        assert_eq!(normalize_seendate(""), "");
        assert_eq!(normalize_seendate("2024-05-10"), "");
        assert_eq!(normalize_seendate("not a date"), "");
    }

    #[test]
    fn article_mapping_synthesizes_content_from_metadata() {
        let json = r#"{
            "title": "Market shift",
            "url": "https://gdelt.example/doc",
            "seendate": "20240510T134500Z",
            "language": "English"
        }"#;
        let article: GdeltArticle = serde_json::from_str(json).unwrap();
        let insight = article.into_insight();

        assert_eq!(insight.source, SourceTag::EventIndex);
        assert_eq!(insight.content, "20240510T134500Z | English");
        assert_eq!(insight.published_at, "2024-05-10T13:45:00Z");
    }
}

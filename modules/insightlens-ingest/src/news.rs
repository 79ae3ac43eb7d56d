// NewsAPI adapter. Topic searches use /everything sorted by publish time;
// without a topic it sweeps /top-headlines.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use insightlens_common::{NewInsight, SourceTag};

use crate::error::{AdapterError, Result};
use crate::traits::SourceAdapter;

const NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2";
const DEFAULT_LANGUAGE: &str = "en";

pub struct NewsApiAdapter {
    api_key: Option<String>,
    language: String,
    client: reqwest::Client,
    base_url: String,
}

impl NewsApiAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .expect("Failed to build NewsAPI HTTP client");
        Self {
            api_key,
            language: DEFAULT_LANGUAGE.to_string(),
            client,
            base_url: NEWSAPI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsArticle>,
}

/// One article from the NewsAPI payload.
#[derive(Debug, Deserialize)]
struct NewsArticle {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    content: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

impl NewsArticle {
    fn into_insight(self) -> NewInsight {
        NewInsight {
            source: SourceTag::NewsSearch,
            title: self.title.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            // Description is usually the fuller field; `content` is a
            // truncated body NewsAPI provides on some plans.
            content: self.description.or(self.content).unwrap_or_default(),
            published_at: self.published_at.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl SourceAdapter for NewsApiAdapter {
    fn source(&self) -> SourceTag {
        SourceTag::NewsSearch
    }

    async fn fetch(&self, topic: Option<&str>, limit: u32) -> Result<Vec<NewInsight>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AdapterError::MissingCredential("NEWS_API_KEY"))?;

        let request = match topic {
            Some(query) => self
                .client
                .get(format!("{}/everything", self.base_url))
                .query(&[
                    ("q", query),
                    ("language", self.language.as_str()),
                    ("sortBy", "publishedAt"),
                ]),
            None => self
                .client
                .get(format!("{}/top-headlines", self.base_url))
                .query(&[("language", self.language.as_str())]),
        };

        let resp = request
            .query(&[("pageSize", limit.to_string())])
            .query(&[("apiKey", api_key)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AdapterError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: NewsApiResponse = resp.json().await?;
        debug!(count = data.articles.len(), "NewsAPI articles fetched");

        Ok(data
            .articles
            .into_iter()
            .map(NewsArticle::into_insight)
            .collect())
    }
}

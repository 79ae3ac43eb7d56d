// Google News RSS adapter, free and keyless. Topic searches hit the /search
// feed; without a topic it pulls the regional top-headlines feed.

use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use tracing::debug;

use insightlens_common::{NewInsight, SourceTag};

use crate::error::{AdapterError, Result};
use crate::traits::SourceAdapter;

const GOOGLE_NEWS_RSS_URL: &str = "https://news.google.com/rss";
const DEFAULT_REGION: &str = "IN:en";

pub struct GoogleNewsRssAdapter {
    client: reqwest::Client,
    base_url: String,
    /// Edition selector in Google's `COUNTRY:lang` form, e.g. "IN:en".
    region: String,
}

impl GoogleNewsRssAdapter {
    pub fn new(region: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build RSS HTTP client");
        Self {
            client,
            base_url: GOOGLE_NEWS_RSS_URL.to_string(),
            region: region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

/// Parse a fetched feed body into canonical insights, newest-first as the
/// feed orders them, truncated to `limit`.
fn parse_feed(bytes: &[u8], limit: usize) -> Result<Vec<NewInsight>> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| AdapterError::Parse(e.to_string()))?;
    Ok(feed
        .entries
        .into_iter()
        .take(limit)
        .map(entry_to_insight)
        .collect())
}

fn entry_to_insight(entry: feed_rs::model::Entry) -> NewInsight {
    let url = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))
        .unwrap_or_default();

    NewInsight {
        source: SourceTag::RssFeed,
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        url,
        // Feed summaries are HTML fragments; they pass through untouched
        // here and are sanitized only when they enter a prompt.
        content: entry.summary.map(|t| t.content).unwrap_or_default(),
        published_at: entry
            .published
            .or(entry.updated)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default(),
    }
}

#[async_trait]
impl SourceAdapter for GoogleNewsRssAdapter {
    fn source(&self) -> SourceTag {
        SourceTag::RssFeed
    }

    async fn fetch(&self, topic: Option<&str>, limit: u32) -> Result<Vec<NewInsight>> {
        let (country, lang) = self.region.split_once(':').unwrap_or(("IN", "en"));
        let hl = format!("{lang}-{country}");

        let request = match topic {
            Some(query) => self
                .client
                .get(format!("{}/search", self.base_url))
                .query(&[("q", query)]),
            None => self.client.get(&self.base_url),
        };

        let resp = request
            .query(&[("hl", hl.as_str()), ("gl", country), ("ceid", self.region.as_str())])
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

        let bytes = resp.bytes().await?;
        let insights = parse_feed(&bytes, limit as usize)?;
        debug!(region = %self.region, count = insights.len(), "Google News RSS entries fetched");
        Ok(insights)
    }
}

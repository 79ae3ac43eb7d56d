// Reddit adapter over the public JSON listing endpoints: no OAuth, just
// a custom User-Agent. Rate limits apply; suitable for light usage.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::debug;

use insightlens_common::{NewInsight, SourceTag};

use crate::error::{AdapterError, Result};
use crate::traits::SourceAdapter;

const REDDIT_BASE_URL: &str = "https://www.reddit.com";
const USER_AGENT: &str = "insightlens/0.1 (+https://github.com/insightlens)";
const DEFAULT_SUBREDDIT: &str = "technology";
const DEFAULT_SORT: &str = "hot";

pub struct RedditAdapter {
    client: reqwest::Client,
    base_url: String,
    sort: String,
}

impl RedditAdapter {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .expect("Failed to build Reddit HTTP client");
        Self {
            client,
            base_url: REDDIT_BASE_URL.to_string(),
            sort: DEFAULT_SORT.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_sort(mut self, sort: &str) -> Self {
        self.sort = sort.to_string();
        self
    }
}

impl Default for RedditAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct RedditListing {
    #[serde(default)]
    data: RedditListingData,
}

#[derive(Debug, Default, Deserialize)]
struct RedditListingData {
    #[serde(default)]
    children: Vec<RedditChild>,
}

#[derive(Debug, Deserialize)]
struct RedditChild {
    data: RedditPost,
}

/// One post from a subreddit listing.
#[derive(Debug, Deserialize)]
struct RedditPost {
    title: Option<String>,
    permalink: Option<String>,
    selftext: Option<String>,
    created_utc: Option<f64>,
}

impl RedditPost {
    fn into_insight(self) -> NewInsight {
        NewInsight {
            source: SourceTag::SocialFeed,
            title: self.title.unwrap_or_default(),
            url: self
                .permalink
                .map(|p| format!("https://reddit.com{p}"))
                .unwrap_or_default(),
            content: self.selftext.unwrap_or_default(),
            published_at: self.created_utc.map(epoch_to_rfc3339).unwrap_or_default(),
        }
    }
}

/// Reddit reports creation time as epoch seconds (fractional).
fn epoch_to_rfc3339(secs: f64) -> String {
    DateTime::<Utc>::from_timestamp(secs as i64, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

#[async_trait]
impl SourceAdapter for RedditAdapter {
    fn source(&self) -> SourceTag {
        SourceTag::SocialFeed
    }

    async fn fetch(&self, topic: Option<&str>, limit: u32) -> Result<Vec<NewInsight>> {
        let subreddit = topic.unwrap_or(DEFAULT_SUBREDDIT);
        let url = format!("{}/r/{}/{}.json", self.base_url, subreddit, self.sort);

        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[("limit", limit.to_string())])
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

        let listing: RedditListing = resp.json().await?;
        debug!(subreddit, count = listing.data.children.len(), "Reddit posts fetched");

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into_insight())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_mapping_joins_permalink_and_converts_epoch() {
        let json = r#"{
            "title": "New model drops",
            "permalink": "/r/technology/comments/abc/new_model_drops/",
            "selftext": "discussion text",
            "created_utc": 1704067200.0
        }"#;
        let post: RedditPost = serde_json::from_str(json).unwrap();
        let insight = post.into_insight();

        assert_eq!(insight.source, SourceTag::SocialFeed);
        assert_eq!(
            insight.url,
            "https://reddit.com/r/technology/comments/abc/new_model_drops/"
        );
        assert_eq!(insight.published_at, "2024-01-01T00:00:00Z");
        assert_eq!(insight.content, "discussion text");
    }

    #[test]
    fn listing_with_missing_fields_still_parses() {
        let json = r#"{"data": {"children": [{"data": {}}]}}"#;
        let listing: RedditListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.data.children.len(), 1);

        let insight = listing
            .data
            .children
            .into_iter()
            .next()
            .unwrap()
            .data
            .into_insight();
        assert_eq!(insight.url, "");
        assert_eq!(insight.published_at, "");
    }
}

// YouTube Data API v3 adapters. Two variants share the wire types: the
// trending sweep (videos endpoint, region chart) and keyword search
// (search endpoint), which additionally tries a per-item transcript
// lookup and falls back to the snippet description.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use insightlens_common::{NewInsight, SourceTag};

use crate::error::{AdapterError, Result};
use crate::traits::SourceAdapter;
use crate::transcript::TranscriptFetcher;

const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_REGION: &str = "US";
const DEFAULT_SEARCH_QUERY: &str = "AI news";

fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(20))
        .build()
        .expect("Failed to build YouTube HTTP client")
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: Option<String>,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: Option<SearchItemId>,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Snippet {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

impl Snippet {
    fn into_insight(self, source: SourceTag, video_id: &str, content: String) -> NewInsight {
        NewInsight {
            source,
            title: self.title.unwrap_or_default(),
            url: if video_id.is_empty() {
                String::new()
            } else {
                watch_url(video_id)
            },
            content,
            published_at: self.published_at.unwrap_or_default(),
        }
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AdapterError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}

// --- Trending ---

pub struct YoutubeTrendingAdapter {
    api_key: Option<String>,
    region: String,
    client: reqwest::Client,
    base_url: String,
}

impl YoutubeTrendingAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            region: DEFAULT_REGION.to_string(),
            client: build_client(),
            base_url: YOUTUBE_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }
}

#[async_trait]
impl SourceAdapter for YoutubeTrendingAdapter {
    fn source(&self) -> SourceTag {
        SourceTag::VideoPlatform
    }

    /// The trending chart has no keyword dimension; `topic` is ignored
    /// and the sweep is scoped by region instead.
    async fn fetch(&self, _topic: Option<&str>, limit: u32) -> Result<Vec<NewInsight>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AdapterError::MissingCredential("YOUTUBE_API_KEY"))?;

        let resp = self
            .client
            .get(format!("{}/videos", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("chart", "mostPopular"),
                ("regionCode", self.region.as_str()),
            ])
            .query(&[("maxResults", limit.to_string())])
            .query(&[("key", api_key)])
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let data: VideoListResponse = resp.json().await?;
        debug!(region = %self.region, count = data.items.len(), "YouTube trending videos fetched");

        Ok(data
            .items
            .into_iter()
            .map(|item| {
                let video_id = item.id.unwrap_or_default();
                let snippet = item.snippet.unwrap_or_default();
                let description = snippet.description.clone().unwrap_or_default();
                snippet.into_insight(SourceTag::VideoPlatform, &video_id, description)
            })
            .collect())
    }
}

// --- Search with transcripts ---

pub struct YoutubeSearchAdapter {
    api_key: Option<String>,
    client: reqwest::Client,
    base_url: String,
    transcripts: TranscriptFetcher,
}

impl YoutubeSearchAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: build_client(),
            base_url: YOUTUBE_API_URL.to_string(),
            transcripts: TranscriptFetcher::new(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_transcript_fetcher(mut self, transcripts: TranscriptFetcher) -> Self {
        self.transcripts = transcripts;
        self
    }
}

#[async_trait]
impl SourceAdapter for YoutubeSearchAdapter {
    fn source(&self) -> SourceTag {
        SourceTag::VideoSearch
    }

    async fn fetch(&self, topic: Option<&str>, limit: u32) -> Result<Vec<NewInsight>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AdapterError::MissingCredential("YOUTUBE_API_KEY"))?;
        let query = topic.unwrap_or(DEFAULT_SEARCH_QUERY);

        let resp = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("part", "snippet"), ("q", query), ("type", "video")])
            .query(&[("maxResults", limit.to_string())])
            .query(&[("key", api_key)])
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let data: SearchListResponse = resp.json().await?;
        debug!(query, count = data.items.len(), "YouTube search results fetched");

        let mut insights = Vec::with_capacity(data.items.len());
        for item in data.items {
            let video_id = item.id.and_then(|id| id.video_id).unwrap_or_default();
            let snippet = item.snippet.unwrap_or_default();
            let description = snippet.description.clone().unwrap_or_default();

            // Transcript failures of any kind degrade this one item to
            // its description; they never fail the whole fetch.
            let content = if video_id.is_empty() {
                description
            } else {
                self.transcripts
                    .fetch(&video_id)
                    .await
                    .unwrap_or(description)
            };

            insights.push(snippet.into_insight(SourceTag::VideoSearch, &video_id, content));
        }

        Ok(insights)
    }
}

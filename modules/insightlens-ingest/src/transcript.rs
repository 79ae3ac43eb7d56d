// Secondary transcript lookup for video insights, via YouTube's public
// timedtext endpoint. Strictly best-effort: every failure mode collapses
// to None and the caller keeps the video's description instead.

use std::time::Duration;

use regex::Regex;
use tracing::debug;

use insightlens_common::strip_html;

const TIMEDTEXT_URL: &str = "https://video.google.com/timedtext";

pub struct TranscriptFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl TranscriptFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build transcript HTTP client");
        Self {
            client,
            base_url: TIMEDTEXT_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// English transcript for a video, or None when the video has no
    /// captions, captions are disabled (empty body), or anything at all
    /// goes wrong on the wire.
    pub async fn fetch(&self, video_id: &str) -> Option<String> {
        let resp = match self
            .client
            .get(&self.base_url)
            .query(&[("lang", "en"), ("v", video_id)])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                debug!(video_id, error = %e, "Transcript fetch failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            debug!(video_id, status = %resp.status(), "Transcript unavailable");
            return None;
        }

        let body = resp.text().await.ok()?;
        let text = parse_timedtext(&body);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl Default for TranscriptFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull caption lines out of a timedtext XML payload and join them into
/// one plain-text transcript.
fn parse_timedtext(xml: &str) -> String {
    let node = Regex::new(r"(?s)<text[^>]*>(.*?)</text>").expect("Invalid timedtext regex");
    let parts: Vec<String> = node
        .captures_iter(xml)
        .filter_map(|c| c.get(1))
        .map(|m| strip_html(m.as_str()))
        .filter(|s| !s.is_empty())
        .collect();
    parts.join(" ")
}

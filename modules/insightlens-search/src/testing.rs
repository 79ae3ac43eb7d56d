// Test doubles for the two trait boundaries the pipeline depends on:
// MockAdapter (SourceAdapter) and MockAgent (CompletionAgent). Both count
// their calls so tests can assert short-circuits and dispatch behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;

use ai_client::CompletionAgent;
use insightlens_common::{Insight, NewInsight, SourceTag};
use insightlens_ingest::error::{AdapterError, Result as AdapterResult};
use insightlens_ingest::SourceAdapter;

// ---------------------------------------------------------------------------
// MockAdapter
// ---------------------------------------------------------------------------

/// A source adapter scripted to return fixed insights or to always fail.
pub struct MockAdapter {
    source: SourceTag,
    items: Vec<NewInsight>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockAdapter {
    pub fn returning(source: SourceTag, items: Vec<NewInsight>) -> Arc<Self> {
        Arc::new(Self {
            source,
            items,
            failure: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn empty(source: SourceTag) -> Arc<Self> {
        Self::returning(source, Vec::new())
    }

    pub fn failing(source: SourceTag, message: &str) -> Arc<Self> {
        Arc::new(Self {
            source,
            items: Vec::new(),
            failure: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn source(&self) -> SourceTag {
        self.source
    }

    async fn fetch(&self, _topic: Option<&str>, _limit: u32) -> AdapterResult<Vec<NewInsight>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(AdapterError::Network(message.clone())),
            None => Ok(self.items.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// MockAgent
// ---------------------------------------------------------------------------

/// A completion agent scripted with one canned response or one error.
pub struct MockAgent {
    response: std::result::Result<String, String>,
    calls: AtomicUsize,
}

impl MockAgent {
    pub fn returning(text: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionAgent for MockAgent {
    async fn complete(
        &self,
        _system: &str,
        _user: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(anyhow!("{message}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Record helpers
// ---------------------------------------------------------------------------

/// A fresh adapter-shaped insight with the given fields.
pub fn new_insight(source: SourceTag, title: &str, url: &str, content: &str) -> NewInsight {
    NewInsight {
        source,
        title: title.to_string(),
        url: url.to_string(),
        content: content.to_string(),
        published_at: String::new(),
    }
}

/// A response-shaped record, as the summarizer sees them.
pub fn record(title: &str, url: &str, content: &str) -> Insight {
    new_insight(SourceTag::RssFeed, title, url, content).into_record()
}

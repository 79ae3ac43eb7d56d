// Fan-out over the configured source adapters, idempotent persistence,
// and the fresh-plus-stored merge that feeds the summarizer. Each search
// request walks DISPATCH → COLLECT → MERGE → DONE; no stage can fail the
// request, only degrade it.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use ai_client::{CompletionAgent, OpenAi, OpenRouter};
use insightlens_common::{
    AppConfig, Insight, LlmProvider, NewInsight, SearchRequest, SearchResponse, SourceTag,
};
use insightlens_ingest::{
    AdapterError, GdeltAdapter, GoogleNewsRssAdapter, NewsApiAdapter, RedditAdapter,
    SourceAdapter, YoutubeSearchAdapter, YoutubeTrendingAdapter,
};
use insightlens_store::InsightStore;

use crate::summarizer::Summarizer;

pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    store: InsightStore,
    summarizer: Summarizer,
}

impl Aggregator {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        store: InsightStore,
        summarizer: Summarizer,
    ) -> Self {
        Self {
            adapters,
            store,
            summarizer,
        }
    }

    /// Wire the default pipeline from configuration: every adapter, the
    /// store, and the configured completion provider. Missing credentials
    /// leave the corresponding source or the summarizer degraded rather
    /// than failing construction.
    pub fn from_config(config: &AppConfig, store: InsightStore) -> Self {
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(NewsApiAdapter::new(config.news_api_key.clone())),
            Arc::new(GdeltAdapter::new()),
            Arc::new(RedditAdapter::new()),
            Arc::new(GoogleNewsRssAdapter::new(Some(config.rss_region.clone()))),
            Arc::new(YoutubeTrendingAdapter::new(config.youtube_api_key.clone())),
            Arc::new(YoutubeSearchAdapter::new(config.youtube_api_key.clone())),
        ];

        let agent: Option<Arc<dyn CompletionAgent>> = match config.completion_api_key() {
            Some(key) => match config.llm_provider {
                LlmProvider::OpenAi => {
                    Some(Arc::new(OpenAi::new(key, config.llm_model.as_str())))
                }
                LlmProvider::OpenRouter => Some(Arc::new(
                    OpenRouter::new(key, config.llm_model.as_str()).with_app_name("InsightLens"),
                )),
            },
            None => {
                warn!("No completion provider credential configured, summaries will be skipped");
                None
            }
        };

        Self::new(adapters, store, Summarizer::new(agent))
    }

    /// Run one search request through the full pipeline. Always produces a
    /// response: adapter failures, store-query failures, and completion
    /// failures each degrade their own contribution and nothing else.
    pub async fn handle_search(&self, request: &SearchRequest) -> SearchResponse {
        let topic = (!request.keyword.is_empty()).then_some(request.keyword.as_str());

        // DISPATCH: all sources fan out concurrently, so one slow upstream
        // (including the event-index backoff loop) cannot hold up the
        // others; every adapter resolves before the pipeline moves on.
        let dispatched = self.dispatch(topic, request.limit).await;

        // COLLECT: individual idempotent saves. The uniqueness constraint
        // makes re-ingesting an already-known record a no-op.
        let fetched: Vec<NewInsight> = dispatched
            .into_iter()
            .flat_map(|(_, items)| items)
            .collect();
        for insight in &fetched {
            self.store.save(insight).await;
        }

        // MERGE: fresh items first, then the store's matches for the same
        // filters. Deliberately not deduplicated: a just-ingested record
        // shows up once as fetched and once as the now-queryable row. See
        // DESIGN.md before "fixing" this.
        let stored = match self.store.query(request).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Store query failed during merge, continuing with fresh results only");
                Vec::new()
            }
        };

        let mut records: Vec<Insight> =
            fetched.into_iter().map(NewInsight::into_record).collect();
        records.extend(stored);

        // DONE: the merged set feeds the summarizer.
        let summary = self.summarizer.summarize(&request.keyword, &records).await;

        SearchResponse { records, summary }
    }

    /// Default-topic sweep across every adapter: fetch and persist without
    /// a search, returning per-source fetched counts.
    pub async fn ingest(&self, topic: Option<&str>, limit: u32) -> Vec<(SourceTag, usize)> {
        let dispatched = self.dispatch(topic, limit).await;

        let mut counts = Vec::with_capacity(dispatched.len());
        for (tag, items) in dispatched {
            for insight in &items {
                self.store.save(insight).await;
            }
            counts.push((tag, items.len()));
        }
        counts
    }

    /// Invoke every adapter concurrently and wait for all of them. This is
    /// the single place adapter failures are logged and demoted to empty
    /// contributions, so every source degrades the same way.
    async fn dispatch(
        &self,
        topic: Option<&str>,
        limit: u32,
    ) -> Vec<(SourceTag, Vec<NewInsight>)> {
        let calls = self.adapters.iter().map(|adapter| {
            let tag = adapter.source();
            async move {
                match adapter.fetch(topic, limit).await {
                    Ok(items) => {
                        info!(source = %tag, count = items.len(), "Source contributed insights");
                        (tag, items)
                    }
                    Err(AdapterError::MissingCredential(var)) => {
                        warn!(source = %tag, credential = var, "Credential not configured, skipping source");
                        (tag, Vec::new())
                    }
                    Err(e) => {
                        warn!(source = %tag, error = %e, "Source failed, continuing without it");
                        (tag, Vec::new())
                    }
                }
            }
        });

        join_all(calls).await
    }
}

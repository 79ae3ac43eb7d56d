use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use insightlens_common::{SearchRequest, SearchResponse, SourceTag};
use insightlens_store::MAX_QUERY_LIMIT;

use crate::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct IngestParams {
    pub topic: Option<String>,
    pub limit: Option<u32>,
}

/// Trigger a one-shot ingestion sweep across every source.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IngestParams>,
) -> Json<Value> {
    let counts = state
        .aggregator
        .ingest(params.topic.as_deref(), params.limit.unwrap_or(10))
        .await;

    let fetched: serde_json::Map<String, Value> = counts
        .into_iter()
        .map(|(tag, n)| (tag.to_string(), json!(n)))
        .collect();

    Json(json!({ "status": "ingestion complete", "fetched": fetched }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Keyword(s) to match in title or content.
    pub query: String,
    /// Restrict stored matches to one source tag.
    pub source: Option<SourceTag>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Run the full search pipeline: fetch, persist, merge, summarize.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let request = SearchRequest {
        keyword: params.query,
        source: params.source,
        limit: params.limit.unwrap_or(20).clamp(1, MAX_QUERY_LIMIT),
        offset: params.offset.unwrap_or(0),
        start_date: params.start_date,
        end_date: params.end_date,
    };

    Json(state.aggregator.handle_search(&request).await)
}

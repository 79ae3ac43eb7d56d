//! Pipeline tests: mocks at the adapter and completion boundaries, a real
//! in-memory store in the middle. Each test follows MOCK → PIPELINE →
//! OUTPUT: script the boundaries, run one search or sweep, assert the
//! response.

use std::sync::Arc;

use insightlens_common::{NewInsight, SearchRequest, SourceTag};
use insightlens_ingest::SourceAdapter;
use insightlens_search::testing::{new_insight, MockAdapter, MockAgent};
use insightlens_search::{Aggregator, Summarizer};
use insightlens_store::InsightStore;

async fn store() -> InsightStore {
    InsightStore::in_memory().await.unwrap()
}

// ---------------------------------------------------------------------------
// Adapter isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn one_failing_adapter_does_not_sink_the_others() {
    let healthy = MockAdapter::returning(
        SourceTag::RssFeed,
        vec![new_insight(
            SourceTag::RssFeed,
            "AI roundup",
            "http://feeds.test/1",
            "weekly digest",
        )],
    );
    let broken = MockAdapter::failing(SourceTag::NewsSearch, "upstream down");

    let aggregator = Aggregator::new(
        vec![
            healthy.clone() as Arc<dyn SourceAdapter>,
            broken.clone() as Arc<dyn SourceAdapter>,
        ],
        store().await,
        Summarizer::disabled(),
    );

    let response = aggregator.handle_search(&SearchRequest::new("AI")).await;

    assert_eq!(healthy.calls(), 1);
    assert_eq!(broken.calls(), 1, "the failing adapter is still dispatched");
    assert!(
        response.records.iter().any(|r| r.title == "AI roundup"),
        "the healthy adapter's contribution survives"
    );
}

// ---------------------------------------------------------------------------
// Merge semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn merged_records_keep_fresh_and_stored_copies() {
    let adapter = MockAdapter::returning(
        SourceTag::RssFeed,
        vec![new_insight(
            SourceTag::RssFeed,
            "AI launch",
            "http://feeds.test/launch",
            "launch coverage",
        )],
    );

    let aggregator = Aggregator::new(
        vec![adapter as Arc<dyn SourceAdapter>],
        store().await,
        Summarizer::disabled(),
    );

    let response = aggregator.handle_search(&SearchRequest::new("AI")).await;

    // One fresh record plus its just-persisted, now-queryable row. The
    // concatenation is the contract; collapsing it is a behavior change.
    assert_eq!(response.records.len(), 2);
    assert_eq!(response.records[0].id, None, "fresh copy has no surrogate id");
    assert!(response.records[1].id.is_some(), "stored copy carries its row id");
    assert_eq!(response.records[0].url, response.records[1].url);
}

// ---------------------------------------------------------------------------
// End-to-end with a seeded store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn seeded_row_flows_through_search_and_summary() {
    let store = store().await;
    store
        .save(&NewInsight {
            source: SourceTag::RssFeed,
            title: "AI launch".to_string(),
            url: "http://x/1".to_string(),
            content: "coverage of the launch".to_string(),
            published_at: "2024-01-01T00:00:00Z".to_string(),
        })
        .await;

    let agent = MockAgent::returning(
        "Summary: Solid launch coverage.\n\
         Key Insights:\n- launch landed well\n\
         Recommendations:\n- follow the next release\n\
         Citations: http://x/1",
    );
    let aggregator = Aggregator::new(
        vec![
            MockAdapter::empty(SourceTag::RssFeed) as Arc<dyn SourceAdapter>,
            MockAdapter::empty(SourceTag::NewsSearch) as Arc<dyn SourceAdapter>,
        ],
        store.clone(),
        Summarizer::new(Some(agent.clone())),
    );

    let response = aggregator
        .handle_search(&SearchRequest::new("AI"))
        .await;

    assert_eq!(response.records.len(), 1);
    let row = &response.records[0];
    assert_eq!(row.title, "AI launch");
    assert!(row.id.is_some());
    assert!(!row.inserted_at.is_empty());

    assert_eq!(agent.calls(), 1);
    assert_eq!(response.summary.text, "Solid launch coverage.");
    assert_eq!(response.summary.citations, vec!["http://x/1"]);
}

#[tokio::test]
async fn empty_store_and_empty_adapters_yield_nothing_to_summarize() {
    let agent = MockAgent::returning("unused");
    let aggregator = Aggregator::new(
        vec![MockAdapter::empty(SourceTag::RssFeed) as Arc<dyn SourceAdapter>],
        store().await,
        Summarizer::new(Some(agent.clone())),
    );

    let response = aggregator
        .handle_search(&SearchRequest::new("nothing-matches-this"))
        .await;

    assert!(response.records.is_empty());
    assert_eq!(response.summary.text, "No insights to summarize.");
    assert_eq!(agent.calls(), 0);
}

// ---------------------------------------------------------------------------
// Ingestion sweep
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ingest_sweep_persists_and_reports_counts() {
    let rss = MockAdapter::returning(
        SourceTag::RssFeed,
        vec![
            new_insight(SourceTag::RssFeed, "a", "http://feeds.test/a", ""),
            new_insight(SourceTag::RssFeed, "b", "http://feeds.test/b", ""),
        ],
    );
    let social = MockAdapter::returning(
        SourceTag::SocialFeed,
        vec![new_insight(SourceTag::SocialFeed, "c", "http://posts.test/c", "")],
    );

    let store = store().await;
    let aggregator = Aggregator::new(
        vec![
            rss as Arc<dyn SourceAdapter>,
            social as Arc<dyn SourceAdapter>,
        ],
        store.clone(),
        Summarizer::disabled(),
    );

    let counts = aggregator.ingest(None, 10).await;
    assert!(counts.contains(&(SourceTag::RssFeed, 2)));
    assert!(counts.contains(&(SourceTag::SocialFeed, 1)));
    assert_eq!(store.count().await.unwrap(), 3);

    // A second sweep re-fetches the same records; the store stays put.
    aggregator.ingest(None, 10).await;
    assert_eq!(store.count().await.unwrap(), 3);
}

// SQLite persistence for insights. The UNIQUE(source, url) constraint is
// the only dedup mechanism in the system; concurrent duplicate writes are
// safe no-ops, so no external locking exists anywhere.

use std::path::Path;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::warn;

use insightlens_common::{Insight, NewInsight, SearchRequest, SourceTag};

use crate::error::{Result, StoreError};

/// Hard cap on rows returned by a single query, whatever the caller asks for.
pub const MAX_QUERY_LIMIT: u32 = 100;

#[derive(Clone)]
pub struct InsightStore {
    pool: SqlitePool,
}

/// A row from the insights table. `source` stays a plain string here;
/// conversion to the typed tag happens when rows leave the store.
#[derive(Debug, Clone, sqlx::FromRow)]
struct InsightRow {
    id: i64,
    source: String,
    title: String,
    url: String,
    content: String,
    published_at: String,
    inserted_at: String,
}

impl InsightRow {
    fn into_insight(self) -> Option<Insight> {
        let source = match SourceTag::from_str(&self.source) {
            Ok(tag) => tag,
            Err(e) => {
                warn!(id = self.id, error = %e, "Skipping row with unknown source tag");
                return None;
            }
        };
        Some(Insight {
            id: Some(self.id),
            source,
            title: self.title,
            url: self.url,
            content: self.content,
            published_at: self.published_at,
            inserted_at: self.inserted_at,
        })
    }
}

impl InsightStore {
    /// Open (or create) the database file and run migrations.
    /// This is the one place in the system where failure is fatal.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::StorageLocation(format!("{}: {e}", parent.display()))
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Single-connection in-memory database for tests.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Persist one insight. Idempotent on (source, url): the first write
    /// wins and a conflicting write changes nothing, not even title or
    /// content. `inserted_at` is assigned here, at write time. Never
    /// propagates a failure; a failed write logs a warning, because one
    /// bad row must not abort an ingestion sweep.
    pub async fn save(&self, insight: &NewInsight) {
        let inserted_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let result = sqlx::query(
            r#"
            INSERT INTO insights (source, title, url, content, published_at, inserted_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(source, url) DO NOTHING
            "#,
        )
        .bind(insight.source.as_str())
        .bind(&insight.title)
        .bind(&insight.url)
        .bind(&insight.content)
        .bind(&insight.published_at)
        .bind(&inserted_at)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            warn!(source = %insight.source, url = %insight.url, error = %e, "Failed to persist insight");
        }
    }

    /// Keyword/date-filtered search over stored insights.
    ///
    /// Keyword matching is a case-insensitive (SQLite ASCII `LIKE`)
    /// substring test against title OR content; the empty keyword matches
    /// every row. Date bounds are inclusive and compare the calendar-date
    /// part of `published_at`; rows whose `published_at` is empty or
    /// unparseable are excluded whenever a date bound is present.
    /// Ordering is `published_at` descending, then `inserted_at`
    /// descending. `limit` is clamped to [`MAX_QUERY_LIMIT`].
    pub async fn query(&self, request: &SearchRequest) -> Result<Vec<Insight>> {
        let limit = request.limit.min(MAX_QUERY_LIMIT) as i64;
        let source = request.source.map(|s| s.as_str().to_string());

        let rows = sqlx::query_as::<_, InsightRow>(
            r#"
            SELECT id, source, title, url, content, published_at, inserted_at
            FROM insights
            WHERE (?1 = '' OR title LIKE '%' || ?1 || '%' OR content LIKE '%' || ?1 || '%')
              AND (?2 IS NULL OR source = ?2)
              AND (?3 IS NULL OR date(published_at) >= date(?3))
              AND (?4 IS NULL OR date(published_at) <= date(?4))
            ORDER BY published_at DESC, inserted_at DESC
            LIMIT ?5 OFFSET ?6
            "#,
        )
        .bind(&request.keyword)
        .bind(&source)
        .bind(&request.start_date)
        .bind(&request.end_date)
        .bind(limit)
        .bind(request.offset as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(InsightRow::into_insight).collect())
    }

    /// Total stored rows.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM insights")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

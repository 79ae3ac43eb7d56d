use async_trait::async_trait;

use insightlens_common::{NewInsight, SourceTag};

use crate::error::Result;

/// One upstream source. Implementations translate their upstream's native
/// response shape into canonical insights stamped with a fixed source tag.
///
/// Failures come back as a typed [`AdapterError`](crate::AdapterError)
/// rather than being swallowed here; the aggregator owns the single
/// log-and-degrade policy for all adapters. Adapters requiring a
/// credential short-circuit with `MissingCredential` before any network
/// call. Duplicate `(source, url)` pairs within one response are
/// forwarded as-is; idempotency is enforced by the store, not here.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// The fixed tag this adapter stamps on every insight it produces.
    fn source(&self) -> SourceTag;

    /// Fetch up to `limit` insights. `topic` is adapter-specific (search
    /// query, subreddit name); `None` selects the adapter's default sweep
    /// (top headlines, trending, default subreddit).
    async fn fetch(&self, topic: Option<&str>, limit: u32) -> Result<Vec<NewInsight>>;
}

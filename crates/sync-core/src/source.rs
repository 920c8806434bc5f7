//! The source capability: something that yields records, in pages or whole.

use crate::record::SourceRecord;

/// A remote source of records.
///
/// Implementations are expected to be cheap to call repeatedly; pagination
/// state lives in the caller's [`crate::Paginator`], not in the source.
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    /// Fetch one bounded page at the given offset. The meaning of `offset`
    /// (page index vs record offset) is decided by the pagination mode; the
    /// source just forwards it.
    async fn fetch_page(&self, offset: u64, limit: u64) -> anyhow::Result<Vec<SourceRecord>>;

    /// Fetch the entire dataset in one request (whole-dataset mode).
    async fn fetch_all(&self) -> anyhow::Result<Vec<SourceRecord>>;
}

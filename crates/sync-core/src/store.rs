//! The store capability: the destination table seen through three narrow
//! operations.

use crate::record::DestinationRow;

/// The destination table.
///
/// The store is bound to a single table at construction time. Reads return
/// nulls as `None` so the resolver can enforce its no-null precondition on
/// lookup columns.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Read the full current content of one lookup column.
    async fn read_lookup_column(&self, column: &str) -> anyhow::Result<Vec<Option<String>>>;

    /// The next available value for the `id` column.
    async fn next_id(&self) -> anyhow::Result<i64>;

    /// Append rows to the table. A constraint violation (e.g. an unknown
    /// country code) fails the whole batch; there is no per-row fallback.
    /// Returns the number of rows written.
    async fn insert_rows(&self, rows: &[DestinationRow]) -> anyhow::Result<usize>;
}

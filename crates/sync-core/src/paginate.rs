//! Bounded page retrieval with two cursor-advance modes.

use crate::record::SourceRecord;
use crate::source::Source;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How the offset query parameter advances between pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationMode {
    /// The offset counts pages: 0, 1, 2, ...
    #[serde(rename = "page")]
    PageAdvance,
    /// The offset counts records already retrieved: 0, limit, 2*limit, ...
    #[serde(rename = "record")]
    RecordAdvance,
}

/// Pagination state: where the next fetch starts and how far it reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub offset: u64,
    pub limit: u64,
    pub mode: PaginationMode,
}

impl PageCursor {
    pub fn new(offset: u64, limit: u64, mode: PaginationMode) -> Self {
        PageCursor {
            offset,
            limit,
            mode,
        }
    }

    /// Move past the page that was just retrieved.
    fn advance(&mut self) {
        self.offset += match self.mode {
            PaginationMode::PageAdvance => 1,
            PaginationMode::RecordAdvance => self.limit,
        };
    }
}

/// Drives retrieval of the source in bounded pages and decides when the
/// source is exhausted.
///
/// Termination policy:
/// - an empty page ends the run;
/// - a failed fetch ends the run silently (logged at warn, never retried) —
///   the external scheduler re-running the whole sync is the recovery path;
/// - a page shorter than `limit` is taken to be the last page. This is the
///   standard last-page heuristic: when the true last page holds exactly
///   `limit` records it costs one extra fetch, which comes back empty and
///   terminates cleanly.
pub struct Paginator {
    cursor: PageCursor,
    exhausted: bool,
}

impl Paginator {
    pub fn new(cursor: PageCursor) -> Self {
        Paginator {
            cursor,
            exhausted: false,
        }
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// Fetch the next page. Returns the records and whether more data may be
    /// available; `(vec![], false)` once the source is exhausted.
    pub async fn next_page(&mut self, source: &dyn Source) -> (Vec<SourceRecord>, bool) {
        if self.exhausted {
            return (Vec::new(), false);
        }

        let records = match source
            .fetch_page(self.cursor.offset, self.cursor.limit)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "Fetch at offset {} failed, treating source as exhausted: {e:#}",
                    self.cursor.offset
                );
                self.exhausted = true;
                return (Vec::new(), false);
            }
        };

        if records.is_empty() {
            debug!("Empty page at offset {}, source exhausted", self.cursor.offset);
            self.exhausted = true;
            return (Vec::new(), false);
        }

        let more = records.len() as u64 >= self.cursor.limit;
        self.cursor.advance();
        if !more {
            debug!(
                "Short page ({} < {}), treating as last page",
                records.len(),
                self.cursor.limit
            );
            self.exhausted = true;
        }

        (records, more)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct PagedSource {
        pages: Vec<Vec<SourceRecord>>,
        calls: Mutex<Vec<u64>>,
        fail_at: Option<usize>,
    }

    impl PagedSource {
        fn new(sizes: &[usize]) -> Self {
            let pages = sizes
                .iter()
                .map(|&n| {
                    (0..n)
                        .map(|i| SourceRecord::from(json!({"school_id": i})))
                        .collect()
                })
                .collect();
            PagedSource {
                pages,
                calls: Mutex::new(Vec::new()),
                fail_at: None,
            }
        }

        fn offsets(&self) -> Vec<u64> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Source for PagedSource {
        async fn fetch_page(&self, offset: u64, _limit: u64) -> anyhow::Result<Vec<SourceRecord>> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push(offset);
            if self.fail_at == Some(index) {
                anyhow::bail!("connection reset");
            }
            Ok(self.pages.get(index).cloned().unwrap_or_default())
        }

        async fn fetch_all(&self) -> anyhow::Result<Vec<SourceRecord>> {
            Ok(self.pages.iter().flatten().cloned().collect())
        }
    }

    #[tokio::test]
    async fn test_short_page_ends_pagination() {
        // Pages of 100, 100, 37 with limit 100: exactly three fetches.
        let source = PagedSource::new(&[100, 100, 37]);
        let mut paginator = Paginator::new(PageCursor::new(
            0,
            100,
            PaginationMode::PageAdvance,
        ));

        let (page, more) = paginator.next_page(&source).await;
        assert_eq!((page.len(), more), (100, true));
        let (page, more) = paginator.next_page(&source).await;
        assert_eq!((page.len(), more), (100, true));
        let (page, more) = paginator.next_page(&source).await;
        assert_eq!((page.len(), more), (37, false));

        // Exhausted: no further fetch is issued.
        let (page, more) = paginator.next_page(&source).await;
        assert!(page.is_empty() && !more);
        assert_eq!(source.offsets().len(), 3);
    }

    #[tokio::test]
    async fn test_page_advance_offsets() {
        let source = PagedSource::new(&[100, 100, 100]);
        let mut paginator = Paginator::new(PageCursor::new(
            0,
            100,
            PaginationMode::PageAdvance,
        ));
        for _ in 0..4 {
            paginator.next_page(&source).await;
        }
        assert_eq!(source.offsets(), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_record_advance_offsets() {
        let source = PagedSource::new(&[100, 100, 100]);
        let mut paginator = Paginator::new(PageCursor::new(
            0,
            100,
            PaginationMode::RecordAdvance,
        ));
        for _ in 0..4 {
            paginator.next_page(&source).await;
        }
        assert_eq!(source.offsets(), vec![0, 100, 200, 300]);
    }

    #[tokio::test]
    async fn test_fetch_error_ends_pagination_silently() {
        let mut source = PagedSource::new(&[100, 100]);
        source.fail_at = Some(1);
        let mut paginator = Paginator::new(PageCursor::new(
            0,
            100,
            PaginationMode::PageAdvance,
        ));

        let (page, more) = paginator.next_page(&source).await;
        assert_eq!((page.len(), more), (100, true));
        // The failed fetch is swallowed, not surfaced.
        let (page, more) = paginator.next_page(&source).await;
        assert!(page.is_empty() && !more);
        assert_eq!(source.offsets().len(), 2);
    }

    #[tokio::test]
    async fn test_cursor_does_not_advance_on_empty_page() {
        let source = PagedSource::new(&[]);
        let mut paginator = Paginator::new(PageCursor::new(
            5,
            50,
            PaginationMode::RecordAdvance,
        ));
        paginator.next_page(&source).await;
        assert_eq!(paginator.cursor().offset, 5);
    }
}

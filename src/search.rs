//! Paged search over the index with hydration into relational records.
//!
//! Paging is purely `(page, per_page)` on this side and `(from, size)` at
//! the engine boundary. The engine owns relevance and sort ordering; hits
//! come back as identifiers and are hydrated through the record store in
//! the order the engine returned them.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use crate::client::EngineClient;
use crate::config::IndexConfig;
use crate::document::Searchable;
use crate::error::Result;
use crate::store::RecordStore;

/// Page size used when the caller does not specify one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Paging and sort parameters for a search.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    page: Option<u32>,
    per_page: Option<u32>,
    sort: Option<String>,
}

impl SearchOptions {
    /// Options with defaults: page 1, page size [`DEFAULT_PER_PAGE`], no sort.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a specific page (1-based).
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Request a specific page size. Clamped to the record type's
    /// configured maximum when one is set.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Sort specification passed through to the engine verbatim, e.g.
    /// `"id"`, `"id:asc"` or `"created_at:desc"`.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub(crate) fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub(crate) fn per_page(&self, max: Option<u32>) -> u32 {
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        match max {
            Some(max) => per_page.min(max),
            None => per_page,
        }
    }

    pub(crate) fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }
}

/// One page of hydrated search results with pagination metadata.
#[derive(Debug)]
pub struct SearchPage<R> {
    items: Vec<R>,
    current_page: u32,
    per_page: u32,
    total_entries: u64,
    // Hits the engine returned for this page, before hydration. Items may
    // be fewer when a hit's record has since left the relational store.
    hit_count: usize,
}

impl<R> SearchPage<R> {
    /// The hydrated records, in engine order.
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Consume the page, keeping the records.
    pub fn into_items(self) -> Vec<R> {
        self.items
    }

    /// Number of hydrated records on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page holds no records.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The requested page number (1-based).
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// The effective page size after clamping.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// The engine's full match count, not just this slice.
    pub fn total_entries(&self) -> u64 {
        self.total_entries
    }

    /// The previous page number; `None` on the first page.
    pub fn previous_page(&self) -> Option<u32> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }

    /// The next page number; `None` when this page reaches the end of the
    /// match set.
    pub fn next_page(&self) -> Option<u32> {
        let from = u64::from(self.current_page - 1) * u64::from(self.per_page);
        (from + (self.hit_count as u64) < self.total_entries).then(|| self.current_page + 1)
    }
}

impl<'a, R> IntoIterator for &'a SearchPage<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<R> IntoIterator for SearchPage<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Execute a search and hydrate the hits into relational records.
///
/// A hit whose record no longer exists in the store is skipped with a
/// warning; the page may then hold fewer than `per_page` items but the
/// search itself does not fail.
pub(crate) async fn execute<R, S>(
    client: &EngineClient,
    config: &IndexConfig<R>,
    store: &S,
    query: &str,
    options: &SearchOptions,
) -> Result<SearchPage<R>>
where
    R: Searchable,
    S: RecordStore<R> + ?Sized,
{
    let page = options.page();
    let per_page = options.per_page(config.max_per_page());
    let from = u64::from(page - 1) * u64::from(per_page);
    let index = config.index_name();

    let response = client
        .search(
            &index,
            R::document_type(),
            query,
            from,
            u64::from(per_page),
            options.sort(),
        )
        .await?;

    let hits = response
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let total_entries = response
        .pointer("/hits/total")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let ids = hit_ids(&hits);
    let records = store.find_by_ids(&ids).await?;
    let mut by_id: HashMap<i64, R> = records
        .into_iter()
        .map(|record| (record.record_id(), record))
        .collect();

    let mut items = Vec::with_capacity(ids.len());
    for id in &ids {
        match by_id.remove(id) {
            Some(record) => items.push(record),
            None => warn!(
                id,
                index = %index,
                doc_type = R::document_type(),
                "hit no longer present in record store, skipping"
            ),
        }
    }

    Ok(SearchPage {
        items,
        current_page: page,
        per_page,
        total_entries,
        hit_count: hits.len(),
    })
}

/// Extract document identifiers from engine hits, preserving order.
fn hit_ids(hits: &[Value]) -> Vec<i64> {
    let mut ids = Vec::with_capacity(hits.len());
    for hit in hits {
        let id = match hit.get("_id") {
            Some(Value::String(s)) => s.parse::<i64>().ok(),
            Some(Value::Number(n)) => n.as_i64(),
            _ => None,
        };
        match id {
            Some(id) => ids.push(id),
            None => warn!(hit = %hit, "hit without a parseable identifier, skipping"),
        }
    }
    ids
}

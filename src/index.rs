//! Lifecycle binding between relational records and the index.
//!
//! A [`SearchIndex`] holds the engine client, the type's resolved
//! configuration and the record store, and turns relational lifecycle
//! events into index writes. Every call is inline and blocking from the
//! caller's perspective: a failed index write during a create surfaces as
//! a failure of that create, never as a swallowed background error.
//! Writes are not guaranteed searchable until [`SearchIndex::refresh`].

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::EngineClient;
use crate::config::IndexConfig;
use crate::document::{index_body, Searchable};
use crate::error::Result;
use crate::percolate;
use crate::search::{self, SearchOptions, SearchPage};
use crate::store::RecordStore;

/// Which lifecycle event triggered an index write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexEvent {
    Create,
    Update,
}

/// Binds one record type to its index.
pub struct SearchIndex<R, S> {
    client: EngineClient,
    config: IndexConfig<R>,
    store: Arc<S>,
}

impl<R, S> std::fmt::Debug for SearchIndex<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("config", &self.config)
            .field("base_url", &self.client.base_url())
            .finish_non_exhaustive()
    }
}

impl<R, S> SearchIndex<R, S>
where
    R: Searchable,
    S: RecordStore<R>,
{
    /// Bind a record type to an index. The configuration is resolved here
    /// and immutable afterwards.
    pub fn new(client: EngineClient, config: IndexConfig<R>, store: Arc<S>) -> Self {
        Self {
            client,
            config,
            store,
        }
    }

    /// The underlying engine client.
    pub fn client(&self) -> &EngineClient {
        &self.client
    }

    /// The type's resolved configuration.
    pub fn config(&self) -> &IndexConfig<R> {
        &self.config
    }

    /// Create the index with the configured settings, then apply the
    /// field-mapping override when one is configured.
    pub async fn create_index(&self) -> Result<()> {
        let index = self.config.index_name();
        self.client
            .create_index(&index, self.config.index_settings())
            .await?;
        if let Some(mapping) = self.config.mapping() {
            self.client
                .put_mapping(&index, R::document_type(), mapping)
                .await?;
        }
        Ok(())
    }

    /// Delete the index.
    pub async fn delete_index(&self) -> Result<()> {
        self.client.delete_index(&self.config.index_name()).await?;
        Ok(())
    }

    /// Delete and recreate the index from the type's configuration.
    /// Resets to empty before a full reindex.
    pub async fn clean_index(&self) -> Result<()> {
        self.delete_index().await?;
        self.create_index().await
    }

    /// Make recent writes visible to search.
    pub async fn refresh(&self) -> Result<()> {
        self.client.refresh(&self.config.index_name()).await?;
        Ok(())
    }

    /// Lifecycle hook for a created record.
    pub async fn after_create(&self, record: &R) -> Result<()> {
        self.reindex(record, IndexEvent::Create).await.map(|_| ())
    }

    /// Lifecycle hook for an updated record.
    pub async fn after_update(&self, record: &R) -> Result<()> {
        self.reindex(record, IndexEvent::Update).await.map(|_| ())
    }

    /// Lifecycle hook for a destroyed record. Removal is unconditional:
    /// the predicate is not consulted, since its truth value may depend on
    /// attributes that are being destroyed.
    pub async fn after_destroy(&self, record: &R) -> Result<()> {
        self.delete_id(record.record_id()).await
    }

    /// Remove a document by bare identifier.
    pub async fn delete_id(&self, id: i64) -> Result<()> {
        self.client
            .delete_document(&self.config.index_name(), R::document_type(), id)
            .await?;
        Ok(())
    }

    /// Index every record from the store, in the store's default order.
    /// An individual record's failure does not abort the batch; it is
    /// logged and skipped. Returns the number of records indexed.
    pub async fn reindex_all(&self) -> Result<usize> {
        let records = self.store.all().await?;
        let mut indexed = 0;
        for record in &records {
            match self.reindex(record, IndexEvent::Update).await {
                Ok(true) => indexed += 1,
                Ok(false) => {}
                Err(error) => warn!(
                    id = record.record_id(),
                    doc_type = R::document_type(),
                    %error,
                    "reindex failed for record, continuing"
                ),
            }
        }
        Ok(indexed)
    }

    /// Run a paged search and hydrate the hits into records.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchPage<R>> {
        search::execute(&self.client, &self.config, self.store.as_ref(), query, options).await
    }

    /// Percolate an arbitrary, possibly unsaved record on demand.
    pub async fn percolate(&self, record: &R) -> Result<Vec<String>> {
        percolate::percolate(&self.client, &self.config, record).await
    }

    /// Index one record for a lifecycle event. Returns whether a document
    /// was written (false when the predicate skipped the instance).
    async fn reindex(&self, record: &R, event: IndexEvent) -> Result<bool> {
        if !self.config.should_index(record) {
            debug!(
                id = record.record_id(),
                doc_type = R::document_type(),
                "indexing predicate returned false, skipping"
            );
            return Ok(false);
        }

        let body = index_body(record, self.config.serialize_filter())?;
        self.client
            .put_document(
                &self.config.index_name(),
                R::document_type(),
                record.record_id(),
                &Value::Object(body),
            )
            .await?;

        if let Some(callback) = self.config.after_index() {
            callback(record);
        }
        if event == IndexEvent::Create {
            if let Some(callback) = self.config.after_index_on_create() {
                callback(record);
            }
        }
        if let Some(callback) = self.config.on_percolate() {
            let matches = percolate::percolate(&self.client, &self.config, record).await?;
            callback(record, matches);
        }

        Ok(true)
    }
}

//! The relational store collaborator.

use async_trait::async_trait;

use crate::error::Result;

/// Lookup operations the sync layer needs from the relational store.
///
/// Implementations wrap the host application's ORM. Failures should be
/// mapped through [`crate::Error::store`].
#[async_trait]
pub trait RecordStore<R>: Send + Sync {
    /// Fetch the records with the given identifiers. Order does not
    /// matter and missing identifiers are simply absent from the result;
    /// the caller reassembles engine order and applies its own policy for
    /// hits that no longer exist.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<R>>;

    /// Every record of the type, in the store's default iteration order.
    /// Used by full reindexing.
    async fn all(&self) -> Result<Vec<R>>;
}

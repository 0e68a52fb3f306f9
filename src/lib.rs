//! Keep relational records and an Elasticsearch index in sync.
//!
//! The crate is a synchronization and query-shaping layer in front of a
//! search engine, not a search engine itself. It decides *when* a record is
//! indexed, *what* subset of its attributes is sent, maps engine responses
//! back onto domain records, and wraps the engine's pagination semantics.
//!
//! The relational store and the engine's REST transport are external
//! collaborators: the store is reached through [`RecordStore`], the engine
//! through [`EngineClient`]. The host application calls
//! [`SearchIndex::after_create`], [`SearchIndex::after_update`] and
//! [`SearchIndex::after_destroy`] from its own ORM lifecycle hooks; every
//! engine call happens inline and its failure surfaces to the caller of the
//! triggering operation.

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod index;
mod percolate;
pub mod search;
pub mod store;

pub use client::EngineClient;
pub use config::{
    default_index, reset_default_index, set_default_index, IndexConfig, SerializeFilter,
    DEFAULT_INDEX,
};
pub use document::{index_body, Searchable};
pub use error::{Error, Result};
pub use index::SearchIndex;
pub use search::{SearchOptions, SearchPage};
pub use store::RecordStore;

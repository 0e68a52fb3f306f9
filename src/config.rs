//! Per-record-type index configuration and the process-wide default index.
//!
//! An [`IndexConfig`] is resolved once when a record type is registered and
//! is immutable afterwards; reconfiguration mid-lifecycle is not supported.
//! Predicate and callback hooks are first-class function values stored in
//! the configuration; absence is `None`.

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde_json::Value;

/// Index name used when no per-type override and no process-wide override
/// are set. One index can hold many document types.
pub const DEFAULT_INDEX: &str = "elastic_searchable";

static DEFAULT_INDEX_OVERRIDE: Lazy<RwLock<Option<String>>> = Lazy::new(|| RwLock::new(None));

/// The process-wide default index name.
pub fn default_index() -> String {
    DEFAULT_INDEX_OVERRIDE
        .read()
        .expect("default index lock poisoned")
        .clone()
        .unwrap_or_else(|| DEFAULT_INDEX.to_string())
}

/// Override the process-wide default index name.
///
/// Intended to be called once at startup. Changing the default while
/// indexing is in flight is racy: concurrent operations may resolve either
/// name.
pub fn set_default_index(name: impl Into<String>) {
    *DEFAULT_INDEX_OVERRIDE
        .write()
        .expect("default index lock poisoned") = Some(name.into());
}

/// Restore the built-in default index name.
pub fn reset_default_index() {
    *DEFAULT_INDEX_OVERRIDE
        .write()
        .expect("default index lock poisoned") = None;
}

/// Which record attributes are serialized into the index document.
///
/// Inclusion and exclusion are mutually exclusive by construction: a
/// configuration carries exactly one variant.
#[derive(Debug, Clone, Default)]
pub enum SerializeFilter {
    /// Serialize all attributes.
    #[default]
    All,
    /// Serialize only the named fields.
    Only(Vec<String>),
    /// Serialize all attributes except the named fields.
    Except(Vec<String>),
}

/// Per-instance boolean check gating whether a record is indexed at all.
pub type IndexPredicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Hook fired after a record is indexed.
pub type IndexCallback<R> = Arc<dyn Fn(&R) + Send + Sync>;

/// Hook fired with the filter names matched by a just-indexed record.
pub type PercolateCallback<R> = Arc<dyn Fn(&R, Vec<String>) + Send + Sync>;

/// Declarative configuration for one record type.
pub struct IndexConfig<R> {
    index_name: Option<String>,
    index_settings: Value,
    mapping: Option<Value>,
    serialize: SerializeFilter,
    should_index: Option<IndexPredicate<R>>,
    after_index: Option<IndexCallback<R>>,
    after_index_on_create: Option<IndexCallback<R>>,
    on_percolate: Option<PercolateCallback<R>>,
    max_per_page: Option<u32>,
}

impl<R> Default for IndexConfig<R> {
    fn default() -> Self {
        Self {
            index_name: None,
            index_settings: Value::Object(serde_json::Map::new()),
            mapping: None,
            serialize: SerializeFilter::All,
            should_index: None,
            after_index: None,
            after_index_on_create: None,
            on_percolate: None,
            max_per_page: None,
        }
    }
}

impl<R> Clone for IndexConfig<R> {
    fn clone(&self) -> Self {
        Self {
            index_name: self.index_name.clone(),
            index_settings: self.index_settings.clone(),
            mapping: self.mapping.clone(),
            serialize: self.serialize.clone(),
            should_index: self.should_index.clone(),
            after_index: self.after_index.clone(),
            after_index_on_create: self.after_index_on_create.clone(),
            on_percolate: self.on_percolate.clone(),
            max_per_page: self.max_per_page,
        }
    }
}

impl<R> std::fmt::Debug for IndexConfig<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexConfig")
            .field("index_name", &self.index_name)
            .field("serialize", &self.serialize)
            .field("has_predicate", &self.should_index.is_some())
            .field("has_percolate", &self.on_percolate.is_some())
            .field("max_per_page", &self.max_per_page)
            .finish_non_exhaustive()
    }
}

impl<R> IndexConfig<R> {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the target index name for this record type.
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    /// Set custom index creation options (analyzer/tokenizer settings).
    pub fn with_index_settings(mut self, settings: Value) -> Self {
        self.index_settings = settings;
        self
    }

    /// Set a field mapping override applied after index creation.
    pub fn with_mapping(mut self, mapping: Value) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// Serialize only the named fields.
    pub fn with_only<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.serialize = SerializeFilter::Only(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Serialize all attributes except the named fields.
    pub fn with_except<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.serialize = SerializeFilter::Except(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Gate indexing on a per-instance predicate. When the predicate
    /// returns false the instance is not sent to the index at all.
    pub fn with_should_index(mut self, predicate: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        self.should_index = Some(Arc::new(predicate));
        self
    }

    /// Fire a hook after every successful index write.
    pub fn with_after_index(mut self, callback: impl Fn(&R) + Send + Sync + 'static) -> Self {
        self.after_index = Some(Arc::new(callback));
        self
    }

    /// Fire an additional hook when the index write came from a create.
    pub fn with_after_index_on_create(
        mut self,
        callback: impl Fn(&R) + Send + Sync + 'static,
    ) -> Self {
        self.after_index_on_create = Some(Arc::new(callback));
        self
    }

    /// Percolate every indexed document and pass the matched filter names
    /// to the given hook.
    pub fn with_on_percolate(
        mut self,
        callback: impl Fn(&R, Vec<String>) + Send + Sync + 'static,
    ) -> Self {
        self.on_percolate = Some(Arc::new(callback));
        self
    }

    /// Cap the page size of search results for this record type.
    pub fn with_max_per_page(mut self, max: u32) -> Self {
        self.max_per_page = Some(max);
        self
    }

    /// The resolved index name: the per-type override when set, otherwise
    /// the process-wide default.
    pub fn index_name(&self) -> String {
        self.index_name.clone().unwrap_or_else(default_index)
    }

    /// Index creation settings.
    pub fn index_settings(&self) -> &Value {
        &self.index_settings
    }

    /// Field mapping override, if configured.
    pub fn mapping(&self) -> Option<&Value> {
        self.mapping.as_ref()
    }

    /// Serialization filter for index documents.
    pub fn serialize_filter(&self) -> &SerializeFilter {
        &self.serialize
    }

    /// Evaluate the indexing predicate for an instance; true when no
    /// predicate is configured.
    pub fn should_index(&self, record: &R) -> bool {
        match &self.should_index {
            Some(predicate) => predicate(record),
            None => true,
        }
    }

    /// After-index hook, if configured.
    pub fn after_index(&self) -> Option<&IndexCallback<R>> {
        self.after_index.as_ref()
    }

    /// After-index-on-create hook, if configured.
    pub fn after_index_on_create(&self) -> Option<&IndexCallback<R>> {
        self.after_index_on_create.as_ref()
    }

    /// Percolation hook, if configured.
    pub fn on_percolate(&self) -> Option<&PercolateCallback<R>> {
        self.on_percolate.as_ref()
    }

    /// Maximum page size for this record type, if configured.
    pub fn max_per_page(&self) -> Option<u32> {
        self.max_per_page
    }
}

//! Mapping domain records into index documents.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::SerializeFilter;
use crate::error::{Error, Result};

/// A domain record that can be indexed.
///
/// Implementors need a stable, immutable identifier that is present before
/// the record is first indexed, and a type name used as the index's
/// document type. The index document has no identity of its own beyond
/// identifier plus type.
pub trait Searchable: Serialize + Send + Sync {
    /// The document type name, analogous to a table name.
    fn document_type() -> &'static str;

    /// The record's unique identifier.
    fn record_id(&self) -> i64;
}

/// Build the document body for a record: its serialized attributes with
/// the configured filter applied.
///
/// This is a pure function of the record's in-memory state. A record that
/// does not serialize to a JSON object cannot become an engine document
/// and is rejected.
pub fn index_body<R: Searchable>(record: &R, filter: &SerializeFilter) -> Result<Map<String, Value>> {
    let value = serde_json::to_value(record)
        .map_err(|e| Error::engine(format!("cannot serialize {}: {e}", R::document_type())))?;
    let Value::Object(mut fields) = value else {
        return Err(Error::engine(format!(
            "{} does not serialize to an object",
            R::document_type()
        )));
    };

    match filter {
        SerializeFilter::All => {}
        SerializeFilter::Only(names) => {
            fields.retain(|field, _| names.iter().any(|name| name == field));
        }
        SerializeFilter::Except(names) => {
            fields.retain(|field, _| !names.iter().any(|name| name == field));
        }
    }

    Ok(fields)
}

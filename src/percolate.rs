//! Percolation: testing candidate documents against registered filters.
//!
//! Instead of running a query over all documents, percolation registers
//! standing queries ("filters") and asks which of them a single candidate
//! document matches. The candidate body is built exactly like an index
//! body, so a persisted record percolates the same way an unsaved one does.

use serde_json::{json, Value};

use crate::client::EngineClient;
use crate::config::IndexConfig;
use crate::document::{index_body, Searchable};
use crate::error::Result;

/// Percolate a record against the type's index and return the matched
/// filter names in engine order.
pub(crate) async fn percolate<R: Searchable>(
    client: &EngineClient,
    config: &IndexConfig<R>,
    record: &R,
) -> Result<Vec<String>> {
    let body = index_body(record, config.serialize_filter())?;
    let request = json!({ "doc": body });
    let response = client
        .percolate(&config.index_name(), R::document_type(), &request)
        .await?;
    Ok(parse_matches(&response))
}

/// Extract the matched filter names from a percolation response, verbatim
/// and order-preserving.
fn parse_matches(response: &Value) -> Vec<String> {
    response
        .get("matches")
        .and_then(Value::as_array)
        .map(|matches| {
            matches
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

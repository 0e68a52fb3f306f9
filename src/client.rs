//! HTTP client for the search engine's REST API.
//!
//! Every method performs exactly one request and validates the decoded
//! response body: an explicit `error` field, or a status other than
//! 200/201, fails the call with [`Error::Engine`]. There are no retries
//! and no circuit breaking; every failure surfaces to the caller.

use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// Engine endpoint used when `ELASTICSEARCH_URL` is not set.
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:9200";

/// Client for a single search-engine endpoint.
#[derive(Debug, Clone)]
pub struct EngineClient {
    http: reqwest::Client,
    base_url: String,
}

impl EngineClient {
    /// Create a client for the given base URL (e.g. `http://localhost:9200`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create a client from the `ELASTICSEARCH_URL` environment variable,
    /// falling back to [`DEFAULT_ENGINE_URL`].
    pub fn from_env() -> Self {
        let url = std::env::var("ELASTICSEARCH_URL")
            .unwrap_or_else(|_| DEFAULT_ENGINE_URL.to_string());
        Self::new(url)
    }

    /// The endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one request against the engine and validate the response.
    ///
    /// All typed methods go through here. The decoded body is returned on
    /// success; timeouts and cancellation are the transport's concern.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::engine(e.to_string()))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::engine(e.to_string()))?;

        match body.get("took").and_then(Value::as_u64) {
            Some(took) => debug!(%method, path, took_ms = took, "engine request"),
            None => debug!(%method, path, "engine request"),
        }

        validate_response(status, body)
    }

    /// Create an index with the given settings.
    pub async fn create_index(&self, name: &str, settings: &Value) -> Result<Value> {
        let body = json!({ "settings": settings });
        self.request(Method::PUT, &format!("/{name}"), &[], Some(&body))
            .await
    }

    /// Delete an index.
    pub async fn delete_index(&self, name: &str) -> Result<Value> {
        self.request(Method::DELETE, &format!("/{name}"), &[], None)
            .await
    }

    /// Read an index's status, including its creation settings.
    pub async fn index_status(&self, name: &str) -> Result<Value> {
        self.request(Method::GET, &format!("/{name}/_status"), &[], None)
            .await
    }

    /// Make recent writes to an index visible to search.
    pub async fn refresh(&self, name: &str) -> Result<Value> {
        self.request(Method::POST, &format!("/{name}/_refresh"), &[], None)
            .await
    }

    /// Set the field mapping for a document type.
    pub async fn put_mapping(&self, index: &str, doc_type: &str, mapping: &Value) -> Result<Value> {
        self.request(
            Method::PUT,
            &format!("/{index}/{doc_type}/_mapping"),
            &[],
            Some(mapping),
        )
        .await
    }

    /// Read the field mapping for a document type.
    pub async fn get_mapping(&self, index: &str, doc_type: &str) -> Result<Value> {
        self.request(Method::GET, &format!("/{index}/{doc_type}/_mapping"), &[], None)
            .await
    }

    /// Store a document, overwriting any existing document with the same id.
    pub async fn put_document(
        &self,
        index: &str,
        doc_type: &str,
        id: i64,
        body: &Value,
    ) -> Result<Value> {
        self.request(
            Method::PUT,
            &format!("/{index}/{doc_type}/{id}"),
            &[],
            Some(body),
        )
        .await
    }

    /// Fetch a document by id.
    pub async fn get_document(&self, index: &str, doc_type: &str, id: i64) -> Result<Value> {
        self.request(Method::GET, &format!("/{index}/{doc_type}/{id}"), &[], None)
            .await
    }

    /// Delete a document by id. Deleting a document that does not exist
    /// fails the same way any other engine error does.
    pub async fn delete_document(&self, index: &str, doc_type: &str, id: i64) -> Result<Value> {
        self.request(Method::DELETE, &format!("/{index}/{doc_type}/{id}"), &[], None)
            .await
    }

    /// Run a query with paging parameters, returning hit ids and the total
    /// match count. `sort` is passed through to the engine verbatim.
    pub async fn search(
        &self,
        index: &str,
        doc_type: &str,
        query: &str,
        from: u64,
        size: u64,
        sort: Option<&str>,
    ) -> Result<Value> {
        let mut params = vec![
            ("q", query.to_string()),
            ("from", from.to_string()),
            ("size", size.to_string()),
        ];
        if let Some(sort) = sort {
            params.push(("sort", sort.to_string()));
        }
        self.request(
            Method::GET,
            &format!("/{index}/{doc_type}/_search"),
            &params,
            None,
        )
        .await
    }

    /// Test a candidate document against the index's registered filters.
    pub async fn percolate(&self, index: &str, doc_type: &str, body: &Value) -> Result<Value> {
        self.request(
            Method::POST,
            &format!("/{index}/{doc_type}/_percolate"),
            &[],
            Some(body),
        )
        .await
    }

    /// Register a named percolation filter for an index.
    pub async fn register_percolator(
        &self,
        index: &str,
        name: &str,
        query: &Value,
    ) -> Result<Value> {
        self.request(
            Method::PUT,
            &format!("/_percolator/{index}/{name}"),
            &[],
            Some(query),
        )
        .await
    }

    /// Make recently registered percolation filters active.
    pub async fn refresh_percolators(&self) -> Result<Value> {
        self.request(Method::POST, "/_percolator/_refresh", &[], None)
            .await
    }
}

/// Engine responses carry an explicit `error` field on failure; otherwise
/// any status outside 200/201 is a failure echoing the raw body.
fn validate_response(status: StatusCode, body: Value) -> Result<Value> {
    if let Some(error) = body.get("error") {
        let message = match error.as_str() {
            Some(message) => message.to_string(),
            None => error.to_string(),
        };
        return Err(Error::Engine(message));
    }
    if !matches!(status, StatusCode::OK | StatusCode::CREATED) {
        return Err(Error::Engine(format!("error executing request: {body}")));
    }
    Ok(body)
}

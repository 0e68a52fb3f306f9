//! Error types for engine and store interactions.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by a relational store implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by indexing, search and percolation operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The engine signaled a failure: an explicit `error` field in the
    /// response body, a non-success status, or a transport/decode failure.
    /// This is the single kind for everything the engine reports; callers
    /// inspect the carried message if finer handling is needed.
    #[error("engine error: {0}")]
    Engine(String),

    /// The relational store failed while hydrating search hits or
    /// iterating records for a reindex.
    #[error("store error: {0}")]
    Store(#[source] BoxError),
}

impl Error {
    /// Create an engine error.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine(message.into())
    }

    /// Create a store error from a collaborator's error.
    pub fn store(error: impl Into<BoxError>) -> Self {
        Self::Store(error.into())
    }
}

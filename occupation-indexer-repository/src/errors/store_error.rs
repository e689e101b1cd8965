//! Document store error types.
//!
//! This module defines the error types that can occur while talking to the
//! document store.

use thiserror::Error;

/// Errors that can occur during document store operations.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Failed to establish connection to the store.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to create or drop a collection.
    #[error("Collection error: {0}")]
    CollectionError(String),

    /// A bulk upsert request failed as a whole.
    #[error("Bulk upsert error: {0}")]
    BulkUpsertError(String),

    /// Failed to fetch a single document.
    #[error("Get error: {0}")]
    GetError(String),

    /// Search query execution failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Failed to parse a response from the store.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize a document for the store.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The named collection does not exist.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
}

impl StoreError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a collection error.
    pub fn collection(msg: impl Into<String>) -> Self {
        Self::CollectionError(msg.into())
    }

    /// Create a bulk upsert error.
    pub fn bulk_upsert(msg: impl Into<String>) -> Self {
        Self::BulkUpsertError(msg.into())
    }

    /// Create a get error.
    pub fn get(msg: impl Into<String>) -> Self {
        Self::GetError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a collection-not-found error.
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound(name.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

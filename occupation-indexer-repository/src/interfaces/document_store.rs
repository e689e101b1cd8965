//! Document store trait definition.
//!
//! This module defines the abstract interface for the search store the
//! pipeline writes into, allowing for different backend implementations
//! (OpenSearch, in-memory mocks, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::collections::CollectionSchema;
use crate::errors::StoreError;
use crate::types::{
    CollectionStats, SearchRequest, SearchResponse, StoredDocument, UpsertItemResult,
};

/// Abstracts the underlying document store.
///
/// Implementations are injected into the loader and the orchestrator as
/// `Arc<dyn DocumentStore>` so that both can be tested against mocks.
///
/// All methods return `Result<T, StoreError>` for consistent error handling
/// across backends.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ensure a collection exists with the declared schema.
    ///
    /// # Arguments
    ///
    /// * `schema` - Declared fields of the collection
    /// * `drop_existing` - Drop and recreate the collection if it already exists
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the collection exists afterwards
    /// * `Err(StoreError)` - If creation fails
    async fn create_collection(
        &self,
        schema: &CollectionSchema,
        drop_existing: bool,
    ) -> Result<(), StoreError>;

    /// Drop a collection.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the collection existed and was dropped
    /// * `Ok(false)` - If there was nothing to drop
    /// * `Err(StoreError)` - If the drop fails
    async fn drop_collection(&self, name: &str) -> Result<bool, StoreError>;

    /// Upsert documents by id in a single request.
    ///
    /// A document whose id already exists replaces the stored one entirely.
    ///
    /// # Arguments
    ///
    /// * `collection` - Logical collection name
    /// * `documents` - Documents to write
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<UpsertItemResult>)` - One result per document, in input order
    /// * `Err(StoreError)` - If the request as a whole failed
    async fn upsert_documents(
        &self,
        collection: &str,
        documents: &[StoredDocument],
    ) -> Result<Vec<UpsertItemResult>, StoreError>;

    /// Fetch one document by id, `None` if it does not exist.
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Run a search against one collection.
    async fn search(
        &self,
        collection: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, StoreError>;

    /// Document statistics of a collection, `None` if it does not exist.
    async fn collection_stats(&self, name: &str) -> Result<Option<CollectionStats>, StoreError>;

    /// Check if the store is healthy and reachable.
    async fn health_check(&self) -> Result<bool, StoreError>;
}

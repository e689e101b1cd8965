//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `DocumentStore`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::{
        request::JsonBody,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts},
    BulkParts, CountParts, GetParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::collections::{schema_for, CollectionSchema};
use crate::config::StoreConfig;
use crate::errors::StoreError;
use crate::interfaces::DocumentStore;
use crate::opensearch::mappings::index_body;
use crate::opensearch::queries::{build_search_body, parse_search_response};
use crate::types::{
    CollectionStats, SearchRequest, SearchResponse, StoredDocument, UpsertItemResult,
};

/// OpenSearch document store.
///
/// Each logical collection maps to one index named
/// `{index_prefix}{collection}`.
///
/// # Example
///
/// ```ignore
/// use occupation_indexer_repository::{collections, OpenSearchStore, StoreConfig};
///
/// let store = OpenSearchStore::new(StoreConfig::new("http://localhost:9200")).await?;
/// store.create_collection(&collections::occupations_schema(), false).await?;
/// ```
pub struct OpenSearchStore {
    client: OpenSearch,
    config: StoreConfig,
}

impl OpenSearchStore {
    /// Create a new store connected to the configured URL.
    ///
    /// # Arguments
    ///
    /// * `config` - Connection URL, index prefix and provisioning settings
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchStore)` - A new store instance
    /// * `Err(StoreError)` - If connection setup fails
    pub async fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| StoreError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %config.url,
            index_prefix = %config.index_prefix,
            "Created OpenSearch store"
        );

        Ok(Self { client, config })
    }

    async fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        Ok(response.status_code().is_success())
    }

    /// Build the bulk request body: one `index` action line per document
    /// followed by its source.
    fn bulk_body(documents: &[StoredDocument]) -> Vec<JsonBody<Value>> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for doc in documents {
            body.push(json!({ "index": { "_id": doc.id } }).into());
            body.push(doc.body.clone().into());
        }
        body
    }

    /// Turn the `items` array of a bulk response into per-document results.
    ///
    /// Documents missing from the response are reported as failed.
    fn parse_bulk_items(documents: &[StoredDocument], response: &Value) -> Vec<UpsertItemResult> {
        let items = response["items"].as_array();

        documents
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let Some(item) = items.and_then(|items| items.get(i)) else {
                    return UpsertItemResult::failed(&doc.id, "missing from bulk response");
                };
                let action = &item["index"];
                if action["error"].is_null() {
                    UpsertItemResult::ok(&doc.id)
                } else {
                    let reason = action["error"]["reason"]
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| action["error"].to_string());
                    UpsertItemResult::failed(&doc.id, reason)
                }
            })
            .collect()
    }
}

#[async_trait]
impl DocumentStore for OpenSearchStore {
    /// Create the index backing a collection.
    ///
    /// An existing index is left untouched unless `drop_existing` is set,
    /// in which case it is deleted and recreated with the declared mappings.
    #[instrument(skip(self, schema), fields(collection = schema.name))]
    async fn create_collection(
        &self,
        schema: &CollectionSchema,
        drop_existing: bool,
    ) -> Result<(), StoreError> {
        let index = self.config.index_name(schema.name);

        if self.index_exists(&index).await? {
            if !drop_existing {
                debug!(index = %index, "Index already exists");
                return Ok(());
            }
            self.drop_collection(schema.name).await?;
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&index))
            .body(index_body(schema, &self.config))
            .send()
            .await
            .map_err(|e| StoreError::collection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Create index request failed");
            return Err(StoreError::collection(format!(
                "Create index {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, fields = schema.fields.len(), "Created index");
        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> Result<bool, StoreError> {
        let index = self.config.index_name(name);

        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index.as_str()]))
            .send()
            .await
            .map_err(|e| StoreError::collection(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - index may not exist
        if status.as_u16() == 404 {
            return Ok(false);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Delete index request failed");
            return Err(StoreError::collection(format!(
                "Delete index {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Dropped index");
        Ok(true)
    }

    /// Write documents with a single bulk request.
    ///
    /// Each document is sent as an `index` action keyed by its id, so an
    /// existing document is replaced wholesale.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn upsert_documents(
        &self,
        collection: &str,
        documents: &[StoredDocument],
    ) -> Result<Vec<UpsertItemResult>, StoreError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let index = self.config.index_name(collection);

        let response = self
            .client
            .bulk(BulkParts::Index(&index))
            .body(Self::bulk_body(documents))
            .send()
            .await
            .map_err(|e| StoreError::bulk_upsert(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(StoreError::bulk_upsert(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;

        let results = Self::parse_bulk_items(documents, &body);
        let failed = results.iter().filter(|r| !r.success).count();
        if failed > 0 {
            warn!(index = %index, failed, "Bulk request rejected some documents");
        }
        debug!(index = %index, total = results.len(), "Bulk request completed");

        Ok(results)
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let index = self.config.index_name(collection);

        let response = self
            .client
            .get(GetParts::IndexId(&index, id))
            .send()
            .await
            .map_err(|e| StoreError::get(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(StoreError::get(format!(
                "Get {} failed with status {}: {}",
                id, status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;

        Ok(body.get("_source").cloned())
    }

    #[instrument(skip(self, request), fields(query = %request.query))]
    async fn search(
        &self,
        collection: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, StoreError> {
        let index = self.config.index_name(collection);
        let schema = schema_for(collection);
        let search_body = build_search_body(schema.as_ref(), request);

        let response = self
            .client
            .search(SearchParts::Index(&[index.as_str()]))
            .body(search_body)
            .send()
            .await
            .map_err(|e| StoreError::query(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(StoreError::collection_not_found(collection));
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Search request failed");
            return Err(StoreError::query(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;

        parse_search_response(&body, request.page)
    }

    async fn collection_stats(&self, name: &str) -> Result<Option<CollectionStats>, StoreError> {
        let index = self.config.index_name(name);

        let response = self
            .client
            .count(CountParts::Index(&[index.as_str()]))
            .send()
            .await
            .map_err(|e| StoreError::query(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(StoreError::query(format!(
                "Count on {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;

        Ok(Some(CollectionStats {
            name: name.to_string(),
            num_documents: body["count"].as_u64().unwrap_or(0),
            num_fields: schema_for(name).map(|s| s.fields.len()).unwrap_or(0),
        }))
    }

    /// Healthy when the cluster answers and its status is not red.
    async fn health_check(&self) -> Result<bool, StoreError> {
        let response = match self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Health check request failed");
                return Ok(false);
            }
        };

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;

        Ok(matches!(body["status"].as_str(), Some("green") | Some("yellow")))
    }
}

//! In-memory collaborators for pipeline tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use occupation_indexer_repository::{
    CollectionSchema, CollectionStats, DocumentStore, SearchHit, SearchRequest, SearchResponse,
    StoreError, StoredDocument, UpsertItemResult,
};
use occupation_indexer_shared::{CompetencyProfile, Granularity, TabularOccupationRow};
use occupation_indexer_sources::{CompetencySource, SourceError, TabularSource};

/// Document store keeping collections in ordered maps.
#[derive(Default)]
pub struct MockStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Value>>>,
    created: Mutex<Vec<(String, bool)>>,
    batch_sizes: Mutex<Vec<usize>>,
    rejected_ids: HashSet<String>,
    /// 1-based index of the upsert call that errors, 0 for none.
    failing_upsert_call: usize,
    upsert_calls: AtomicUsize,
    healthy: bool,
    /// Stats ignore upserts, like an index that has not refreshed yet.
    lagging_stats: bool,
    visible_counts: Mutex<HashMap<String, u64>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
    }

    pub fn fail_upsert_call(mut self, call: usize) -> Self {
        self.failing_upsert_call = call;
        self
    }

    pub fn reject_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rejected_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn lagging_stats(mut self) -> Self {
        self.lagging_stats = true;
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub async fn insert(&self, collection: &str, id: &str, body: Value) {
        let mut collections = self.collections.lock().await;
        let docs = collections.entry(collection.to_string()).or_default();
        docs.insert(id.to_string(), body);
        self.visible_counts
            .lock()
            .await
            .insert(collection.to_string(), docs.len() as u64);
    }

    pub async fn document(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections
            .lock()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
    }

    pub async fn document_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .await
            .get(collection)
            .map_or(0, |docs| docs.len())
    }

    pub async fn upsert_batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().await.clone()
    }

    pub async fn created_collections(&self) -> Vec<(String, bool)> {
        self.created.lock().await.clone()
    }
}

#[async_trait]
impl DocumentStore for MockStore {
    async fn create_collection(
        &self,
        schema: &CollectionSchema,
        drop_existing: bool,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().await;
        if drop_existing {
            collections.remove(schema.name);
        }
        let count = collections.entry(schema.name.to_string()).or_default().len();
        self.visible_counts
            .lock()
            .await
            .insert(schema.name.to_string(), count as u64);
        self.created
            .lock()
            .await
            .push((schema.name.to_string(), drop_existing));
        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.collections.lock().await.remove(name).is_some())
    }

    async fn upsert_documents(
        &self,
        collection: &str,
        documents: &[StoredDocument],
    ) -> Result<Vec<UpsertItemResult>, StoreError> {
        self.batch_sizes.lock().await.push(documents.len());
        let call = self.upsert_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.failing_upsert_call {
            return Err(StoreError::bulk_upsert("connection reset"));
        }

        let mut collections = self.collections.lock().await;
        let docs = collections.entry(collection.to_string()).or_default();
        Ok(documents
            .iter()
            .map(|doc| {
                if self.rejected_ids.contains(&doc.id) {
                    UpsertItemResult::failed(&doc.id, "mapper_parsing_exception")
                } else {
                    docs.insert(doc.id.clone(), doc.body.clone());
                    UpsertItemResult::ok(&doc.id)
                }
            })
            .collect())
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.document(collection, id).await)
    }

    async fn search(
        &self,
        collection: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, StoreError> {
        let collections = self.collections.lock().await;
        let docs = collections
            .get(collection)
            .ok_or_else(|| StoreError::collection_not_found(collection))?;
        let hits = docs
            .iter()
            .skip(request.offset())
            .take(request.per_page)
            .map(|(id, body)| SearchHit {
                id: id.clone(),
                score: None,
                document: body.clone(),
            })
            .collect();
        Ok(SearchResponse {
            found: docs.len() as u64,
            page: request.page,
            hits,
            facet_counts: Vec::new(),
        })
    }

    async fn collection_stats(&self, name: &str) -> Result<Option<CollectionStats>, StoreError> {
        let collections = self.collections.lock().await;
        let Some(docs) = collections.get(name) else {
            return Ok(None);
        };
        let num_documents = if self.lagging_stats {
            self.visible_counts
                .lock()
                .await
                .get(name)
                .copied()
                .unwrap_or_default()
        } else {
            docs.len() as u64
        };
        Ok(Some(CollectionStats {
            name: name.to_string(),
            num_documents,
            num_fields: 0,
        }))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(self.healthy)
    }
}

/// Tabular source serving fixed rows per granularity.
#[derive(Default)]
pub struct MockTabular {
    rows: HashMap<Granularity, Vec<TabularOccupationRow>>,
    unavailable: HashSet<Granularity>,
    pub calls: AtomicUsize,
}

impl MockTabular {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, granularity: Granularity, rows: Vec<TabularOccupationRow>) -> Self {
        self.rows.insert(granularity, rows);
        self
    }

    pub fn unavailable(mut self, granularity: Granularity) -> Self {
        self.unavailable.insert(granularity);
        self
    }
}

#[async_trait]
impl TabularSource for MockTabular {
    async fn fetch_rows(
        &self,
        granularity: Granularity,
        _year: i32,
    ) -> Result<Vec<TabularOccupationRow>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.contains(&granularity) {
            return Err(SourceError::unavailable(format!(
                "{} archive not found",
                granularity
            )));
        }
        Ok(self.rows.get(&granularity).cloned().unwrap_or_default())
    }
}

/// Competency source serving fixed profiles by versioned code.
#[derive(Default)]
pub struct MockCompetency {
    profiles: HashMap<String, CompetencyProfile>,
    requested: Mutex<Vec<String>>,
}

impl MockCompetency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: CompetencyProfile) -> Self {
        self.profiles.insert(profile.code.clone(), profile);
        self
    }

    pub async fn requested(&self) -> Vec<String> {
        self.requested.lock().await.clone()
    }
}

#[async_trait]
impl CompetencySource for MockCompetency {
    async fn fetch_profile(&self, versioned_code: &str) -> Result<CompetencyProfile, SourceError> {
        self.requested.lock().await.push(versioned_code.to_string());
        self.profiles
            .get(versioned_code)
            .cloned()
            .ok_or_else(|| SourceError::profile_fetch_failed(versioned_code, "HTTP 404"))
    }
}

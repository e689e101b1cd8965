//! Loader module for the occupation indexer pipeline.
//!
//! Splits documents into chunks and upserts them into the document store,
//! tallying per-document outcomes.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use occupation_indexer_repository::{DocumentStore, StoredDocument};
use occupation_indexer_shared::IndexDocument;

/// Configuration for the document loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of documents per upsert request.
    pub batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { batch_size: 100 }
    }
}

/// Success and failure tally of one load call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadResult {
    pub success: usize,
    pub failed: usize,
    /// Last chunk-level error, or the stage error that prevented loading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadResult {
    /// Result of a stage that failed before anything could be loaded.
    pub fn stage_failed(error: impl Into<String>) -> Self {
        Self {
            success: 0,
            failed: 0,
            error: Some(error.into()),
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}

/// Loader that upserts documents into the store.
///
/// Re-running a load with the same documents overwrites them by id; the
/// loader never deletes anything.
pub struct DocumentLoader {
    store: Arc<dyn DocumentStore>,
    config: LoaderConfig,
}

impl DocumentLoader {
    /// Create a new loader with the default batch size.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            config: LoaderConfig::default(),
        }
    }

    /// Create a new loader with custom configuration.
    pub fn with_config(store: Arc<dyn DocumentStore>, config: LoaderConfig) -> Self {
        Self { store, config }
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    /// Load documents using the configured batch size.
    pub async fn load<D: IndexDocument + Sync>(
        &self,
        collection: &str,
        documents: &[D],
    ) -> LoadResult {
        self.index_documents(collection, documents, self.config.batch_size)
            .await
    }

    /// Upsert documents in chunks of `batch_size`.
    ///
    /// A chunk whose request fails as a whole is counted as failed in full and
    /// the remaining chunks are still attempted.
    ///
    /// # Arguments
    ///
    /// * `collection` - Logical collection name
    /// * `documents` - Documents to upsert, keyed by their own id
    /// * `batch_size` - Documents per upsert request, at least 1
    ///
    /// # Returns
    ///
    /// The per-document success and failure counts.
    #[instrument(
        skip(self, collection, documents),
        fields(collection = %collection, count = documents.len())
    )]
    pub async fn index_documents<D: IndexDocument + Sync>(
        &self,
        collection: &str,
        documents: &[D],
        batch_size: usize,
    ) -> LoadResult {
        let mut result = LoadResult::default();
        if documents.is_empty() {
            debug!("Nothing to load");
            return result;
        }

        for (batch, chunk) in documents.chunks(batch_size.max(1)).enumerate() {
            let mut stored = Vec::with_capacity(chunk.len());
            for document in chunk {
                match StoredDocument::from_document(document) {
                    Ok(doc) => stored.push(doc),
                    Err(e) => {
                        let id = document.document_id();
                        warn!(id = %id, error = %e, "Failed to serialize document");
                        result.failed += 1;
                    }
                }
            }
            if stored.is_empty() {
                continue;
            }

            match self.store.upsert_documents(collection, &stored).await {
                Ok(items) => {
                    let accepted = items.iter().filter(|item| item.success).count();
                    let rejected = stored.len().saturating_sub(accepted);
                    for item in items.iter().filter(|item| !item.success) {
                        debug!(
                            id = %item.id,
                            error = item.error.as_deref().unwrap_or("unknown"),
                            "Document rejected"
                        );
                    }
                    result.success += accepted;
                    result.failed += rejected;
                }
                Err(e) => {
                    let err = PipelineError::load_batch_failed(collection, batch, e.to_string());
                    error!(batch, size = stored.len(), error = %err, "Chunk upsert failed");
                    result.failed += stored.len();
                    result.error = Some(err.to_string());
                }
            }
        }

        info!(
            success = result.success,
            failed = result.failed,
            "Load completed"
        );
        result
    }
}

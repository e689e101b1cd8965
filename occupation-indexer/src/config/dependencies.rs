//! Dependency initialization and wiring for the occupation indexer.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::IndexingError;
use occupation_indexer_pipeline::Orchestrator;
use occupation_indexer_repository::{DocumentStore, OpenSearchStore};
use occupation_indexer_sources::{BlsBulkClient, OnetClient};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
    store: Arc<dyn DocumentStore>,
}

impl Dependencies {
    /// Build the source clients, the store client and the orchestrator.
    ///
    /// No network call is made here; use [`Dependencies::verify_store`] to
    /// check the store before writing to it.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If a client cannot be constructed
    pub async fn new(settings: &Settings) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            index_prefix = %settings.index_prefix,
            data_year = settings.data_year,
            batch_size = settings.batch_size,
            "Initializing dependencies"
        );

        let store = OpenSearchStore::new(settings.store_config())
            .await
            .map_err(|e| IndexingError::config(format!("Failed to create store client: {}", e)))?;
        let store: Arc<dyn DocumentStore> = Arc::new(store);

        let tabular = BlsBulkClient::new(settings.tabular_config())?;
        let competency = OnetClient::new(settings.competency_config())?;

        let orchestrator = Orchestrator::with_config(
            Arc::new(tabular),
            Arc::new(competency),
            store.clone(),
            settings.loader_config(),
            settings.orchestrator_config(),
        );

        Ok(Self {
            orchestrator,
            store,
        })
    }

    /// Fail unless the store is reachable and healthy.
    pub async fn verify_store(&self) -> Result<(), IndexingError> {
        let healthy = self
            .store
            .health_check()
            .await
            .map_err(|e| IndexingError::config(format!("Store health check failed: {}", e)))?;

        if !healthy {
            warn!("Store reported an unhealthy cluster");
            return Err(IndexingError::config("Store cluster is unhealthy"));
        }

        info!("Store connection verified");
        Ok(())
    }
}

//! Results returned by the orchestrator operations.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::loader::LoadResult;

/// Outcome of a full refresh run.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub run_id: Uuid,
    pub started: DateTime<Utc>,
    pub completed: DateTime<Utc>,
    pub duration_seconds: f64,
    /// Set when the competency fetch was capped.
    pub partial: bool,
    pub national_records: usize,
    pub competency_profiles_loaded: usize,
    pub competency_failures: usize,
    pub occupations: LoadResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_wages: Option<LoadResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metro_wages: Option<LoadResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<LoadResult>,
}

/// Outcome of an incremental competency update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub run_id: Uuid,
    pub started: DateTime<Utc>,
    pub completed: DateTime<Utc>,
    pub requested: usize,
    pub updated: usize,
    pub failed: usize,
    /// Codes with no indexed occupation document.
    pub missing: usize,
}

/// Outcome of a national wage refresh.
#[derive(Debug, Clone, Serialize)]
pub struct WageRefreshReport {
    pub run_id: Uuid,
    pub started: DateTime<Utc>,
    pub completed: DateTime<Utc>,
    /// Stored occupations before the refresh.
    pub previous_count: u64,
    /// Detailed occupations in the fresh national dataset.
    pub new_count: u64,
    pub national_records: usize,
    /// Documents whose competency fields were carried over.
    pub preserved_competency: usize,
    pub occupations: LoadResult,
}

/// Document count of one collection; `None` when it does not exist or could
/// not be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionStatus {
    pub name: String,
    pub num_documents: Option<u64>,
}

/// Health and size of the indexed data.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub store_healthy: bool,
    pub collections: Vec<CollectionStatus>,
    pub data_year: i32,
    pub last_check: DateTime<Utc>,
}

//! Collaborator traits for the upstream sources.
//!
//! The pipeline only depends on these traits, so the real HTTP clients can be
//! swapped for in-memory mocks in tests.

use async_trait::async_trait;

use crate::errors::SourceError;
use occupation_indexer_shared::{CompetencyProfile, Granularity, TabularOccupationRow};

/// Bulk wage and employment dataset.
#[async_trait]
pub trait TabularSource: Send + Sync {
    /// Fetch every detailed occupation row for one granularity and year.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<TabularOccupationRow>)` - Rows in source order
    /// * `Err(SourceError::SourceUnavailable)` - If the dataset could not be
    ///   fetched or decoded
    async fn fetch_rows(
        &self,
        granularity: Granularity,
        year: i32,
    ) -> Result<Vec<TabularOccupationRow>, SourceError>;
}

/// Per-occupation competency service.
#[async_trait]
pub trait CompetencySource: Send + Sync {
    /// Fetch the full competency profile of one occupation.
    ///
    /// # Arguments
    ///
    /// * `versioned_code` - Occupation code with revision suffix, e.g. `15-1252.00`
    ///
    /// # Returns
    ///
    /// * `Ok(CompetencyProfile)` - The assembled profile
    /// * `Err(SourceError::ProfileFetchFailed)` - If a required call failed
    async fn fetch_profile(&self, versioned_code: &str) -> Result<CompetencyProfile, SourceError>;
}

//! # Occupation Indexer Pipeline
//!
//! This crate provides the pipeline components that turn the wage dataset
//! and the competency service into three searchable collections.
//!
//! ## Architecture
//!
//! The pipeline follows the Extract-Transform-Load pattern:
//!
//! 1. **Sources**: Fetch tabular rows and competency profiles
//! 2. **Transformer**: Builds occupation, location wage and skill documents
//! 3. **Aggregator**: Groups competencies across occupations
//! 4. **Loader**: Upserts documents into the store in chunks
//! 5. **Orchestrator**: Coordinates the stages and reports per-stage counts

pub mod aggregator;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod transformer;

#[cfg(test)]
mod test_support;

pub use aggregator::SkillAggregator;
pub use errors::PipelineError;
pub use loader::{DocumentLoader, LoadResult, LoaderConfig};
pub use orchestrator::{
    CollectionStatus, Orchestrator, OrchestratorConfig, PipelineStatus, RefreshOptions,
    RefreshReport, UpdateReport, WageRefreshReport,
};
pub use transformer::DocumentTransformer;

//! # Occupation Indexer
//!
//! Entry point library for the occupation indexer: settings, dependency
//! wiring, and the top-level error type used by the command line binary.

pub mod config;

pub use config::{Dependencies, Settings};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] occupation_indexer_pipeline::PipelineError),

    /// Store error.
    #[error("Store error: {0}")]
    StoreError(#[from] occupation_indexer_repository::StoreError),

    /// Source client error.
    #[error("Source error: {0}")]
    SourceError(#[from] occupation_indexer_sources::SourceError),

    /// Report serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

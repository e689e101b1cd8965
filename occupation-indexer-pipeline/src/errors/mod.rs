//! Error types for the occupation indexer pipeline.

use occupation_indexer_repository::StoreError;
use occupation_indexer_shared::CodeError;
use occupation_indexer_sources::SourceError;
use thiserror::Error;

/// Errors that can occur in the pipeline.
///
/// Only `SourceUnavailable` and `Store` abort a run; the others are logged
/// where they happen and turned into counters.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The tabular dataset could not be fetched or decoded.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// The competency profile of one occupation could not be fetched.
    #[error("Profile fetch failed for {code}: {message}")]
    ProfileFetchFailed { code: String, message: String },

    /// The store rejected or errored on one chunk of documents.
    #[error("Load of batch {batch} into {collection} failed: {message}")]
    LoadBatchFailed {
        collection: String,
        batch: usize,
        message: String,
    },

    /// An occupation code could not be reduced to canonical form.
    #[error("Cannot normalize occupation code {0:?}")]
    NormalizationFailed(String),

    /// A stored document could not be read back into its record type.
    #[error("Invalid stored document {id}: {message}")]
    InvalidDocument { id: String, message: String },

    /// Error from the document store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Any other upstream error.
    #[error("Source error: {0}")]
    Source(SourceError),
}

impl PipelineError {
    /// Create a load batch error.
    pub fn load_batch_failed(
        collection: impl Into<String>,
        batch: usize,
        msg: impl Into<String>,
    ) -> Self {
        Self::LoadBatchFailed {
            collection: collection.into(),
            batch,
            message: msg.into(),
        }
    }

    /// Create an invalid document error.
    pub fn invalid_document(id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidDocument {
            id: id.into(),
            message: msg.into(),
        }
    }
}

impl From<SourceError> for PipelineError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::SourceUnavailable(msg) => Self::SourceUnavailable(msg),
            SourceError::ProfileFetchFailed { code, message } => {
                Self::ProfileFetchFailed { code, message }
            }
            other => Self::Source(other),
        }
    }
}

impl From<CodeError> for PipelineError {
    fn from(err: CodeError) -> Self {
        match err {
            CodeError::NormalizationFailed(raw) => Self::NormalizationFailed(raw),
        }
    }
}

//! Document store layer for the occupation indexer.
//!
//! Declares the three collections the pipeline writes to, the backend-neutral
//! [`DocumentStore`] trait, and its OpenSearch implementation.

pub mod collections;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use collections::{CollectionSchema, FieldSchema, FieldType};
pub use config::StoreConfig;
pub use errors::StoreError;
pub use interfaces::DocumentStore;
pub use opensearch::OpenSearchStore;
pub use types::{
    CollectionStats, FacetCounts, FieldFilter, FilterValue, SearchHit, SearchRequest,
    SearchResponse, SortOrder, StoredDocument, UpsertItemResult,
};

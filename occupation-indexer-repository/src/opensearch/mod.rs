//! OpenSearch implementation of the document store.
//!
//! This module provides a concrete implementation of `DocumentStore`
//! using OpenSearch as the backend.

mod client;
pub mod mappings;
pub mod queries;

pub use client::OpenSearchStore;

//! Error types for the occupation indexer repository.

mod store_error;

pub use store_error::StoreError;

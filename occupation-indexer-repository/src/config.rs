//! Configuration types for the document store.

/// Default OpenSearch URL.
pub const DEFAULT_STORE_URL: &str = "http://localhost:9200";

/// Connection and provisioning parameters for the document store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store server URL.
    pub url: String,
    /// Prefix prepended to every logical collection name to form the
    /// physical index name. Empty by default.
    pub index_prefix: String,
    /// Primary shards per collection.
    pub number_of_shards: u32,
    /// Replicas per collection.
    pub number_of_replicas: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_STORE_URL.to_string(),
            index_prefix: String::new(),
            number_of_shards: 1,
            number_of_replicas: 1,
        }
    }
}

impl StoreConfig {
    /// Create a config for the given URL with default provisioning settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the index name prefix.
    pub fn with_index_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.index_prefix = prefix.into();
        self
    }

    /// Physical index name for a logical collection.
    pub fn index_name(&self, collection: &str) -> String {
        format!("{}{}", self.index_prefix, collection)
    }
}

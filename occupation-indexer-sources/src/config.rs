//! Configuration types for the upstream sources.

use std::path::PathBuf;

use crate::retry::RetryPolicy;

/// Default location of the bulk wage archives.
pub const DEFAULT_BULK_DOWNLOAD_BASE: &str = "https://www.bls.gov/oes/special-requests/";

/// Default base URL of the competency web service.
pub const DEFAULT_COMPETENCY_BASE_URL: &str = "https://services.onetcenter.org/ws/";

/// Default base URL of the wage time-series API.
pub const DEFAULT_SERIES_BASE_URL: &str = "https://api.bls.gov/publicAPI/v2/";

/// Settings of the bulk tabular source.
#[derive(Debug, Clone)]
pub struct TabularSourceConfig {
    /// URL prefix the archive file name is appended to.
    pub bulk_download_base: String,
    /// User agent sent with downloads; the archive host rejects anonymous clients.
    pub user_agent: String,
    /// Timeout of one archive download in seconds.
    pub timeout_secs: u64,
    /// Directory downloaded archives are cached in. No caching when `None`.
    pub cache_dir: Option<PathBuf>,
}

impl Default for TabularSourceConfig {
    fn default() -> Self {
        Self {
            bulk_download_base: DEFAULT_BULK_DOWNLOAD_BASE.to_string(),
            user_agent: concat!("occupation-indexer/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 120,
            cache_dir: None,
        }
    }
}

/// Settings of the competency web service client.
#[derive(Debug, Clone)]
pub struct CompetencySourceConfig {
    pub base_url: String,
    pub username: String,
    pub app_key: String,
    /// Pause after every successful call, in milliseconds.
    pub rate_limit_delay_ms: u64,
    /// Timeout of one call in seconds.
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for CompetencySourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_COMPETENCY_BASE_URL.to_string(),
            username: String::new(),
            app_key: String::new(),
            rate_limit_delay_ms: 200,
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

impl CompetencySourceConfig {
    /// Create a config with the given credentials and default settings.
    pub fn new(username: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            app_key: app_key.into(),
            ..Self::default()
        }
    }
}

/// Settings of the wage time-series API client.
#[derive(Debug, Clone)]
pub struct SeriesSourceConfig {
    pub base_url: String,
    /// Registration key sent in the request body. Unregistered use when empty.
    pub api_key: String,
    /// Upper bound of series ids in one request.
    pub max_series_per_request: usize,
    /// Pause after every successful request, in milliseconds.
    pub rate_limit_delay_ms: u64,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for SeriesSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERIES_BASE_URL.to_string(),
            api_key: String::new(),
            max_series_per_request: 50,
            rate_limit_delay_ms: 500,
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

//! Settings read from the process environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::IndexingError;
use occupation_indexer_pipeline::{LoaderConfig, OrchestratorConfig};
use occupation_indexer_repository::config::DEFAULT_STORE_URL;
use occupation_indexer_repository::StoreConfig;
use occupation_indexer_sources::config::{
    DEFAULT_BULK_DOWNLOAD_BASE, DEFAULT_COMPETENCY_BASE_URL, DEFAULT_SERIES_BASE_URL,
};
use occupation_indexer_sources::{CompetencySourceConfig, SeriesSourceConfig, TabularSourceConfig};

const DEFAULT_DATA_YEAR: i32 = 2024;
const DEFAULT_BATCH_SIZE: usize = 100;
const DEFAULT_RATE_LIMIT_MS: u64 = 200;

/// Every setting the indexer reads, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bulk_download_base: String,
    pub bls_api_base_url: String,
    pub bls_api_key: String,
    pub onet_base_url: String,
    pub onet_username: String,
    pub onet_app_key: String,
    pub onet_rate_limit_ms: u64,
    pub opensearch_url: String,
    pub index_prefix: String,
    pub batch_size: usize,
    pub data_year: i32,
    pub cache_dir: Option<PathBuf>,
    /// Overrides both source timeouts when set.
    pub http_timeout_secs: Option<u64>,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `BLS_BULK_DOWNLOAD_BASE`: Base URL of the bulk wage archives
    /// - `BLS_API_BASE_URL` / `BLS_API_KEY`: Wage time-series API and its key
    /// - `ONET_BASE_URL`: Competency service base URL
    /// - `ONET_USERNAME` / `ONET_APP_KEY`: Competency service credentials
    /// - `ONET_RATE_LIMIT_MS`: Pause after each competency call (default: 200)
    /// - `OPENSEARCH_URL`: Store URL (default: http://localhost:9200)
    /// - `INDEX_PREFIX`: Prefix for physical index names
    /// - `BATCH_SIZE`: Documents per upsert request (default: 100)
    /// - `DATA_YEAR`: Year of the wage dataset (default: 2024)
    /// - `CACHE_DIR`: Directory caching downloaded archives
    /// - `HTTP_TIMEOUT_SECS`: Timeout for both source clients
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - Resolved settings
    /// * `Err(IndexingError)` - If a numeric variable does not parse
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            bulk_download_base: var("BLS_BULK_DOWNLOAD_BASE")
                .unwrap_or_else(|| DEFAULT_BULK_DOWNLOAD_BASE.to_string()),
            bls_api_base_url: var("BLS_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SERIES_BASE_URL.to_string()),
            bls_api_key: var("BLS_API_KEY").unwrap_or_default(),
            onet_base_url: var("ONET_BASE_URL")
                .unwrap_or_else(|| DEFAULT_COMPETENCY_BASE_URL.to_string()),
            onet_username: var("ONET_USERNAME").unwrap_or_default(),
            onet_app_key: var("ONET_APP_KEY").unwrap_or_default(),
            onet_rate_limit_ms: parse(&var, "ONET_RATE_LIMIT_MS")?
                .unwrap_or(DEFAULT_RATE_LIMIT_MS),
            opensearch_url: var("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_STORE_URL.to_string()),
            index_prefix: var("INDEX_PREFIX").unwrap_or_default(),
            batch_size: parse(&var, "BATCH_SIZE")?.unwrap_or(DEFAULT_BATCH_SIZE),
            data_year: parse(&var, "DATA_YEAR")?.unwrap_or(DEFAULT_DATA_YEAR),
            cache_dir: var("CACHE_DIR").map(PathBuf::from),
            http_timeout_secs: parse(&var, "HTTP_TIMEOUT_SECS")?,
        })
    }

    /// Fail unless competency service credentials are configured.
    pub fn require_competency_credentials(&self) -> Result<(), IndexingError> {
        if self.onet_username.is_empty() || self.onet_app_key.is_empty() {
            return Err(IndexingError::config(
                "ONET_USERNAME and ONET_APP_KEY must be set to fetch competency data",
            ));
        }
        Ok(())
    }

    pub fn tabular_config(&self) -> TabularSourceConfig {
        let mut config = TabularSourceConfig {
            bulk_download_base: self.bulk_download_base.clone(),
            cache_dir: self.cache_dir.clone(),
            ..Default::default()
        };
        if let Some(timeout) = self.http_timeout_secs {
            config.timeout_secs = timeout;
        }
        config
    }

    pub fn competency_config(&self) -> CompetencySourceConfig {
        let mut config = CompetencySourceConfig::new(&self.onet_username, &self.onet_app_key);
        config.base_url = self.onet_base_url.clone();
        config.rate_limit_delay_ms = self.onet_rate_limit_ms;
        if let Some(timeout) = self.http_timeout_secs {
            config.timeout_secs = timeout;
        }
        config
    }

    pub fn series_config(&self) -> SeriesSourceConfig {
        let mut config = SeriesSourceConfig {
            base_url: self.bls_api_base_url.clone(),
            api_key: self.bls_api_key.clone(),
            ..Default::default()
        };
        if let Some(timeout) = self.http_timeout_secs {
            config.timeout_secs = timeout;
        }
        config
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.opensearch_url).with_index_prefix(&self.index_prefix)
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            batch_size: self.batch_size,
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            data_year: self.data_year,
            ..Default::default()
        }
    }

    /// Printable view of the settings with the keys masked.
    pub fn redacted(&self) -> Value {
        json!({
            "bulk_download_base": self.bulk_download_base,
            "bls_api_base_url": self.bls_api_base_url,
            "bls_api_key": mask(&self.bls_api_key),
            "onet_base_url": self.onet_base_url,
            "onet_username": self.onet_username,
            "onet_app_key": mask(&self.onet_app_key),
            "onet_rate_limit_ms": self.onet_rate_limit_ms,
            "opensearch_url": self.opensearch_url,
            "index_prefix": self.index_prefix,
            "batch_size": self.batch_size,
            "data_year": self.data_year,
            "cache_dir": self.cache_dir,
            "http_timeout_secs": self.http_timeout_secs,
        })
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "***"
    }
}

fn parse<T, F>(var: &F, key: &str) -> Result<Option<T>, IndexingError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                IndexingError::config(format!("{} must be a number, got {:?}: {}", key, raw, e))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, IndexingError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]).unwrap();

        assert_eq!(settings.data_year, 2024);
        assert_eq!(settings.batch_size, 100);
        assert_eq!(settings.onet_rate_limit_ms, 200);
        assert_eq!(settings.opensearch_url, DEFAULT_STORE_URL);
        assert_eq!(settings.cache_dir, None);
        assert_eq!(settings.tabular_config().timeout_secs, 120);
        assert_eq!(settings.competency_config().timeout_secs, 30);
        assert_eq!(settings.competency_config().retry.max_attempts, 3);
        assert_eq!(settings.series_config().base_url, DEFAULT_SERIES_BASE_URL);
        assert_eq!(settings.series_config().max_series_per_request, 50);
        assert_eq!(settings.redacted()["bls_api_key"], "");
        assert!(settings.require_competency_credentials().is_err());
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("ONET_USERNAME", "user"),
            ("ONET_APP_KEY", "secret"),
            ("BLS_API_KEY", "registered"),
            ("OPENSEARCH_URL", "http://search:9200"),
            ("INDEX_PREFIX", "staging_"),
            ("BATCH_SIZE", " 250 "),
            ("DATA_YEAR", "2023"),
            ("CACHE_DIR", "/var/cache/oews"),
            ("HTTP_TIMEOUT_SECS", "15"),
            ("ONET_RATE_LIMIT_MS", ""),
        ])
        .unwrap();

        assert!(settings.require_competency_credentials().is_ok());
        assert_eq!(settings.loader_config().batch_size, 250);
        assert_eq!(settings.orchestrator_config().data_year, 2023);
        assert_eq!(settings.store_config().index_name("skills"), "staging_skills");
        assert_eq!(
            settings.tabular_config().cache_dir,
            Some(PathBuf::from("/var/cache/oews"))
        );
        assert_eq!(settings.tabular_config().timeout_secs, 15);
        assert_eq!(settings.competency_config().timeout_secs, 15);
        assert_eq!(settings.competency_config().rate_limit_delay_ms, 200);
        assert_eq!(settings.series_config().api_key, "registered");
        assert_eq!(settings.series_config().timeout_secs, 15);
        assert_eq!(settings.redacted()["onet_app_key"], "***");
        assert_eq!(settings.redacted()["bls_api_key"], "***");
    }

    #[test]
    fn test_unparseable_number_is_config_error() {
        let err = settings(&[("BATCH_SIZE", "lots")]).unwrap_err();

        assert!(matches!(err, IndexingError::ConfigError(_)));
        assert!(err.to_string().contains("BATCH_SIZE"));
    }
}

//! Bulk wage and employment archives.
//!
//! One zip archive per granularity and year, each holding a single
//! spreadsheet. A failed download is not retried here: the orchestrator
//! treats it as fatal for the stage.

mod archive;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::config::TabularSourceConfig;
use crate::errors::SourceError;
use crate::interfaces::TabularSource;
use occupation_indexer_shared::{Granularity, TabularOccupationRow};

pub use archive::{decode_archive, extract_spreadsheet, rows_from_range};

/// File name of the archive for a granularity and year, e.g. `oesm24nat.zip`.
pub fn archive_name(granularity: Granularity, year: i32) -> String {
    format!(
        "oesm{:02}{}.zip",
        year.rem_euclid(100),
        granularity.archive_suffix()
    )
}

/// Client for the bulk wage archives.
///
/// The underlying HTTP client is created once and reused for every download.
pub struct BlsBulkClient {
    http: Client,
    config: TabularSourceConfig,
}

impl BlsBulkClient {
    /// Create a new client.
    ///
    /// # Returns
    ///
    /// * `Ok(BlsBulkClient)` - A new client instance
    /// * `Err(SourceError)` - If the HTTP client cannot be built
    pub fn new(config: TabularSourceConfig) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SourceError::invalid_request(e.to_string()))?;

        Ok(Self { http, config })
    }

    fn archive_url(&self, name: &str) -> String {
        format!("{}{}", self.config.bulk_download_base, name)
    }

    fn cache_path(&self, name: &str) -> Option<PathBuf> {
        self.config.cache_dir.as_ref().map(|dir| dir.join(name))
    }

    /// Get the raw archive bytes, from the cache when possible.
    ///
    /// Cache read and write failures are logged and otherwise ignored.
    pub async fn fetch_archive(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        let cache_path = self.cache_path(name);

        if let Some(path) = &cache_path {
            match tokio::fs::read(path).await {
                Ok(bytes) => {
                    info!(path = %path.display(), bytes = bytes.len(), "Using cached archive");
                    return Ok(bytes);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Cannot read cached archive"),
            }
        }

        let bytes = self.download(name).await?;

        if let Some(path) = &cache_path {
            if let Err(e) = write_cache(path, &bytes).await {
                warn!(path = %path.display(), error = %e, "Cannot write archive cache");
            }
        }

        Ok(bytes)
    }

    async fn download(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        let url = self.archive_url(name);
        info!(url = %url, "Downloading bulk archive");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::unavailable(format!("download of {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::unavailable(format!(
                "download of {} failed with status {}",
                url, status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::unavailable(format!("download of {} failed: {}", url, e)))?;

        Ok(bytes.to_vec())
    }
}

async fn write_cache(path: &std::path::Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await
}

#[async_trait]
impl TabularSource for BlsBulkClient {
    #[instrument(skip(self, granularity), fields(granularity = %granularity))]
    async fn fetch_rows(
        &self,
        granularity: Granularity,
        year: i32,
    ) -> Result<Vec<TabularOccupationRow>, SourceError> {
        let name = archive_name(granularity, year);
        let bytes = self.fetch_archive(&name).await?;

        let rows = tokio::task::spawn_blocking(move || decode_archive(bytes))
            .await
            .map_err(|e| SourceError::unavailable(format!("decoding {} aborted: {}", name, e)))??;

        info!(rows = rows.len(), "Fetched detailed occupation rows");
        Ok(rows)
    }
}

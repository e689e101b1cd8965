//! Wage time-series API client.
//!
//! Complements the bulk archives with per-series lookups: every series id
//! names one measure (employment, a mean, a median or a percentile) of one
//! occupation in one area. Requests are capped at a fixed number of ids, so
//! larger lookups are split into consecutive batches.

mod wire;

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::SeriesSourceConfig;
use crate::errors::SourceError;
use crate::retry::retry_with_backoff;

pub use wire::{SeriesData, SeriesObservation, SeriesResponse};
use wire::{SeriesEnvelope, SeriesRequest};

const SERIES_PREFIX: &str = "OEUM";
const NATIONAL_AREA: &str = "0000000";
const ALL_INDUSTRIES: &str = "000000";
const ALL_OCCUPATIONS: &str = "000000";
const DATA_PATH: &str = "timeseries/data/";

/// Measure a series reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesDataType {
    #[default]
    Employment,
    HourlyMean,
    AnnualMean,
    HourlyMedian,
    AnnualMedian,
    HourlyPct10,
    HourlyPct25,
    HourlyPct75,
    HourlyPct90,
    AnnualPct10,
    AnnualPct25,
    AnnualPct75,
    AnnualPct90,
}

impl SeriesDataType {
    /// Two-digit code closing the series id.
    pub fn code(&self) -> &'static str {
        match self {
            SeriesDataType::Employment => "01",
            SeriesDataType::HourlyMean => "03",
            SeriesDataType::AnnualMean => "04",
            SeriesDataType::HourlyPct10 => "07",
            SeriesDataType::HourlyMedian => "08",
            SeriesDataType::HourlyPct25 => "10",
            SeriesDataType::HourlyPct75 => "11",
            SeriesDataType::HourlyPct90 => "12",
            SeriesDataType::AnnualMedian => "13",
            SeriesDataType::AnnualPct10 => "14",
            SeriesDataType::AnnualPct25 => "15",
            SeriesDataType::AnnualPct75 => "16",
            SeriesDataType::AnnualPct90 => "17",
        }
    }
}

/// Parts of a wage series id: area, industry, occupation and measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesId {
    pub area_code: String,
    pub industry_code: String,
    pub occupation_code: String,
    pub data_type: SeriesDataType,
}

impl Default for SeriesId {
    fn default() -> Self {
        Self {
            area_code: NATIONAL_AREA.to_string(),
            industry_code: ALL_INDUSTRIES.to_string(),
            occupation_code: ALL_OCCUPATIONS.to_string(),
            data_type: SeriesDataType::Employment,
        }
    }
}

impl SeriesId {
    /// Cross-industry national series of one occupation.
    ///
    /// Separators are removed from `soc_code` and at most six characters
    /// are kept, so `15-1252` and `15-1252.00` name the same series.
    pub fn national(soc_code: &str, data_type: SeriesDataType) -> Self {
        let occupation_code: String = soc_code
            .chars()
            .filter(|c| *c != '-' && *c != '.')
            .take(6)
            .collect();
        Self {
            occupation_code,
            data_type,
            ..Self::default()
        }
    }

    pub fn national_employment(soc_code: &str) -> String {
        Self::national(soc_code, SeriesDataType::Employment).build()
    }

    pub fn national_wage(soc_code: &str, data_type: SeriesDataType) -> String {
        Self::national(soc_code, data_type).build()
    }

    pub fn build(&self) -> String {
        format!(
            "{}{}{}{}{}",
            SERIES_PREFIX,
            self.area_code,
            self.industry_code,
            self.occupation_code,
            self.data_type.code()
        )
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

/// Client for the wage time-series API.
pub struct BlsSeriesClient {
    http: Client,
    endpoint: Url,
    config: SeriesSourceConfig,
}

impl BlsSeriesClient {
    /// Create a new client.
    ///
    /// # Returns
    ///
    /// * `Ok(BlsSeriesClient)` - A new client instance
    /// * `Err(SourceError)` - If the base URL is invalid or the HTTP client
    ///   cannot be built
    pub fn new(config: SeriesSourceConfig) -> Result<Self, SourceError> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)
            .and_then(|url| url.join(DATA_PATH))
            .map_err(|e| SourceError::invalid_request(format!("invalid base URL: {}", e)))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::invalid_request(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            config,
        })
    }

    /// Fetch up to `max_series_per_request` series in one request.
    ///
    /// # Arguments
    ///
    /// * `series_ids` - Series ids, see [`SeriesId`]
    /// * `start_year` / `end_year` - Inclusive year range
    ///
    /// # Returns
    ///
    /// * `Ok(SeriesResponse)` - The API's answer, which may itself report a
    ///   failed request through its status
    /// * `Err(SourceError)` - If too many ids were given or the request
    ///   failed after retries
    #[instrument(skip(self, series_ids), fields(count = series_ids.len()))]
    pub async fn fetch_series(
        &self,
        series_ids: &[String],
        start_year: i32,
        end_year: i32,
    ) -> Result<SeriesResponse, SourceError> {
        if series_ids.len() > self.config.max_series_per_request {
            return Err(SourceError::invalid_request(format!(
                "at most {} series per request, got {}",
                self.config.max_series_per_request,
                series_ids.len()
            )));
        }

        let request = SeriesRequest {
            seriesid: series_ids,
            startyear: start_year.to_string(),
            endyear: end_year.to_string(),
            registrationkey: Some(self.config.api_key.as_str()).filter(|key| !key.is_empty()),
        };

        let envelope = retry_with_backoff(&self.config.retry, DATA_PATH, || {
            self.post_once(&request)
        })
        .await?;

        if self.config.rate_limit_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.rate_limit_delay_ms)).await;
        }
        Ok(envelope.into_response())
    }

    /// Fetch any number of series, one request per chunk of
    /// `max_series_per_request` ids.
    ///
    /// A chunk the API answers with a failed status is logged and skipped;
    /// a chunk whose request fails aborts the whole call.
    pub async fn fetch_series_batched(
        &self,
        series_ids: &[String],
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<SeriesData>, SourceError> {
        let mut all = Vec::new();

        for (batch, chunk) in series_ids
            .chunks(self.config.max_series_per_request.max(1))
            .enumerate()
        {
            let response = self.fetch_series(chunk, start_year, end_year).await?;
            if response.is_success() {
                all.extend(response.series);
            } else {
                warn!(batch, messages = ?response.messages, "Series batch failed");
            }
        }

        info!(requested = series_ids.len(), received = all.len(), "Fetched series");
        Ok(all)
    }

    async fn post_once(&self, request: &SeriesRequest<'_>) -> Result<SeriesEnvelope, SourceError> {
        debug!(url = %self.endpoint, "Posting series request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        response
            .json::<SeriesEnvelope>()
            .await
            .map_err(|e| SourceError::decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: &str) -> BlsSeriesClient {
        BlsSeriesClient::new(SeriesSourceConfig {
            base_url: format!("{}/publicAPI/v2", server.uri()),
            api_key: api_key.to_string(),
            rate_limit_delay_ms: 0,
            retry: RetryPolicy {
                max_attempts: 2,
                initial_delay_ms: 1,
                max_delay_ms: 5,
            },
            ..SeriesSourceConfig::default()
        })
        .unwrap()
    }

    fn succeeded(series_ids: &[&str]) -> Value {
        let series: Vec<Value> = series_ids
            .iter()
            .map(|id| {
                json!({
                    "seriesID": id,
                    "data": [{
                        "year": "2024",
                        "period": "A01",
                        "periodName": "Annual",
                        "value": "132270"
                    }]
                })
            })
            .collect();
        json!({ "status": "REQUEST_SUCCEEDED", "message": [], "Results": { "series": series } })
    }

    fn ids(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| SeriesId::national_employment(&format!("15-{:04}", i)))
            .collect()
    }

    async fn request_bodies(server: &MockServer) -> Vec<Value> {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }

    #[test]
    fn test_national_series_ids() {
        assert_eq!(
            SeriesId::national_employment("15-1252"),
            "OEUM000000000000015125201"
        );
        assert_eq!(
            SeriesId::national_wage("15-1252.00", SeriesDataType::AnnualMedian),
            "OEUM000000000000015125213"
        );
    }

    #[test]
    fn test_custom_series_id() {
        let series = SeriesId {
            area_code: "5100000".to_string(),
            occupation_code: "151252".to_string(),
            data_type: SeriesDataType::AnnualMean,
            ..SeriesId::default()
        };

        assert_eq!(series.to_string(), "OEUM510000000000015125204");
    }

    #[tokio::test]
    async fn test_fetch_series_sends_key_and_year_range() {
        let server = MockServer::start().await;
        let id = SeriesId::national_employment("15-1252");

        Mock::given(method("POST"))
            .and(path("/publicAPI/v2/timeseries/data/"))
            .and(body_partial_json(json!({
                "seriesid": [id.clone()],
                "startyear": "2022",
                "endyear": "2024",
                "registrationkey": "secret"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(succeeded(&[&id])))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server, "secret")
            .fetch_series(&[id.clone()], 2022, 2024)
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.series[0].series_id, id);
        assert_eq!(response.series[0].data[0].value, "132270");
    }

    #[tokio::test]
    async fn test_no_key_leaves_it_out_of_the_payload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(succeeded(&[])))
            .mount(&server)
            .await;

        client_for(&server, "")
            .fetch_series(&ids(1), 2024, 2024)
            .await
            .unwrap();

        let bodies = request_bodies(&server).await;
        assert!(bodies[0].get("registrationkey").is_none());
    }

    #[tokio::test]
    async fn test_too_many_series_is_rejected_without_a_request() {
        let server = MockServer::start().await;

        let result = client_for(&server, "").fetch_series(&ids(51), 2024, 2024).await;

        assert!(matches!(result, Err(SourceError::InvalidRequest(_))));
        assert!(request_bodies(&server).await.is_empty());
    }

    #[tokio::test]
    async fn test_batched_fetch_splits_into_fifties() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/publicAPI/v2/timeseries/data/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(succeeded(&["OEUM1"])))
            .expect(3)
            .mount(&server)
            .await;

        let series = client_for(&server, "secret")
            .fetch_series_batched(&ids(120), 2024, 2024)
            .await
            .unwrap();

        let sizes: Vec<usize> = request_bodies(&server)
            .await
            .iter()
            .map(|body| body["seriesid"].as_array().map_or(0, Vec::len))
            .collect();
        assert_eq!(sizes, vec![50, 50, 20]);
        assert_eq!(series.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_batch_status_is_skipped() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "REQUEST_NOT_PROCESSED",
                "message": ["Daily threshold reached"]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(succeeded(&["OEUM2"])))
            .mount(&server)
            .await;

        let series = client_for(&server, "")
            .fetch_series_batched(&ids(60), 2024, 2024)
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].series_id, "OEUM2");
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(succeeded(&["OEUM3"])))
            .mount(&server)
            .await;

        let response = client_for(&server, "")
            .fetch_series(&ids(1), 2024, 2024)
            .await
            .unwrap();

        assert_eq!(response.series.len(), 1);
        assert_eq!(request_bodies(&server).await.len(), 2);
    }
}

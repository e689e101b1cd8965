//! Request and response bodies of the time-series API.

use serde::{Deserialize, Serialize};

const REQUEST_SUCCEEDED: &str = "REQUEST_SUCCEEDED";

#[derive(Debug, Serialize)]
pub(crate) struct SeriesRequest<'a> {
    pub seriesid: &'a [String],
    pub startyear: String,
    pub endyear: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrationkey: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SeriesEnvelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Vec<String>,
    #[serde(rename = "Results", default)]
    pub results: SeriesResults,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SeriesResults {
    #[serde(default)]
    pub series: Vec<SeriesData>,
}

/// Observations of one series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesData {
    #[serde(rename = "seriesID", default)]
    pub series_id: String,
    #[serde(default)]
    pub data: Vec<SeriesObservation>,
}

/// One observation, kept as the API's strings. Suppressed values come back
/// as `-`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesObservation {
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub period: String,
    #[serde(rename = "periodName", default)]
    pub period_name: String,
    #[serde(default)]
    pub value: String,
}

/// Outcome of one series request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesResponse {
    pub status: String,
    pub series: Vec<SeriesData>,
    pub messages: Vec<String>,
}

impl SeriesResponse {
    pub fn is_success(&self) -> bool {
        self.status == REQUEST_SUCCEEDED
    }
}

impl SeriesEnvelope {
    pub fn into_response(self) -> SeriesResponse {
        SeriesResponse {
            status: if self.status.is_empty() {
                "UNKNOWN".to_string()
            } else {
                self.status
            },
            series: self.results.series,
            messages: self.message,
        }
    }
}

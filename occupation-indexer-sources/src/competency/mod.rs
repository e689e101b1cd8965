//! Competency web service client.
//!
//! One profile is assembled from nine sequential calls. Every call goes
//! through the retry helper and is followed by a fixed rate-limit pause.

mod wire;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::CompetencySourceConfig;
use crate::errors::SourceError;
use crate::interfaces::CompetencySource;
use crate::retry::retry_with_backoff;
use occupation_indexer_shared::{CompetencyKind, CompetencyProfile};

pub use wire::OccupationSummary;
use wire::{
    EducationSummary, ElementList, JobZoneSummary, OccupationInfo, OccupationList, TaskSummary,
    TechnologySummary,
};

/// Page size used when walking the whole catalogue.
const CATALOGUE_PAGE_SIZE: usize = 1000;

fn occupation_path(code: &str) -> String {
    format!("online/occupations/{}", code)
}

fn summary_path(code: &str, section: &str) -> String {
    format!("online/occupations/{}/summary/{}", code, section)
}

/// Client for the competency web service.
///
/// Authenticates with HTTP basic auth and reuses one connection pool for
/// every call.
pub struct OnetClient {
    http: Client,
    base_url: Url,
    config: CompetencySourceConfig,
}

impl OnetClient {
    /// Create a new client.
    ///
    /// # Returns
    ///
    /// * `Ok(OnetClient)` - A new client instance
    /// * `Err(SourceError)` - If the base URL is invalid or the HTTP client
    ///   cannot be built
    pub fn new(config: CompetencySourceConfig) -> Result<Self, SourceError> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| SourceError::invalid_request(format!("invalid base URL: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::invalid_request(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    async fn rate_limit(&self) {
        if self.config.rate_limit_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.rate_limit_delay_ms)).await;
        }
    }

    /// GET a JSON endpoint with retries, then pause for the rate limit.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| SourceError::invalid_request(format!("invalid path {}: {}", path, e)))?;

        let value = retry_with_backoff(&self.config.retry, path, || {
            self.get_once(url.clone(), query)
        })
        .await?;

        self.rate_limit().await;
        Ok(value)
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        debug!(url = %url, "Fetching competency endpoint");

        let response = self
            .http
            .get(url)
            .basic_auth(&self.config.username, Some(&self.config.app_key))
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::decode(e.to_string()))
    }

    /// Search the catalogue by keyword.
    pub async fn search_occupations(
        &self,
        keyword: &str,
    ) -> Result<Vec<OccupationSummary>, SourceError> {
        let list: OccupationList = self
            .get_json("online/search", &[("keyword", keyword.to_string())])
            .await?;
        Ok(list.occupation)
    }

    /// List one page of the catalogue, `start` and `end` being 1-based and
    /// inclusive.
    pub async fn list_occupations(
        &self,
        start: usize,
        end: usize,
    ) -> Result<Vec<OccupationSummary>, SourceError> {
        let list: OccupationList = self
            .get_json(
                "online/occupations",
                &[("start", start.to_string()), ("end", end.to_string())],
            )
            .await?;
        Ok(list.occupation)
    }

    /// Occupations the service lists as related to `code`.
    pub async fn related_occupations(
        &self,
        code: &str,
    ) -> Result<Vec<OccupationSummary>, SourceError> {
        let list: OccupationList = self
            .get_json(&summary_path(code, "related_occupations"), &[])
            .await?;
        Ok(list.occupation)
    }

    /// Walk the whole catalogue page by page until an empty page comes back.
    pub async fn list_all_occupations(&self) -> Result<Vec<OccupationSummary>, SourceError> {
        let mut all = Vec::new();
        let mut start = 1;

        loop {
            let page = self
                .list_occupations(start, start + CATALOGUE_PAGE_SIZE - 1)
                .await?;
            if page.is_empty() {
                break;
            }
            let full_page = page.len() == CATALOGUE_PAGE_SIZE;
            all.extend(page);
            if !full_page {
                break;
            }
            start += CATALOGUE_PAGE_SIZE;
        }

        Ok(all)
    }
}

#[async_trait]
impl CompetencySource for OnetClient {
    /// Assemble a profile from the basic info, job zone, skills, knowledge,
    /// abilities, technology, tasks, education and outlook calls.
    ///
    /// Education and outlook are best-effort; any other failure fails the
    /// whole profile.
    #[instrument(skip(self))]
    async fn fetch_profile(&self, versioned_code: &str) -> Result<CompetencyProfile, SourceError> {
        let code = versioned_code;
        let fail = |e: SourceError| SourceError::profile_fetch_failed(code, e.to_string());

        let info: OccupationInfo = self
            .get_json(&occupation_path(code), &[])
            .await
            .map_err(fail)?;
        let job_zone: JobZoneSummary = self
            .get_json(&summary_path(code, "job_zone"), &[])
            .await
            .map_err(fail)?;
        let skills: ElementList = self
            .get_json(&summary_path(code, "skills"), &[])
            .await
            .map_err(fail)?;
        let knowledge: ElementList = self
            .get_json(&summary_path(code, "knowledge"), &[])
            .await
            .map_err(fail)?;
        let abilities: ElementList = self
            .get_json(&summary_path(code, "abilities"), &[])
            .await
            .map_err(fail)?;
        let technology: TechnologySummary = self
            .get_json(&summary_path(code, "technology_skills"), &[])
            .await
            .map_err(fail)?;
        let tasks: TaskSummary = self
            .get_json(&summary_path(code, "tasks"), &[])
            .await
            .map_err(fail)?;

        let education = match self
            .get_json::<EducationSummary>(&summary_path(code, "education"), &[])
            .await
        {
            Ok(summary) => summary.into_levels(),
            Err(e) => {
                warn!(code = %code, error = %e, "Education lookup failed, continuing without it");
                Vec::new()
            }
        };

        let bright_outlook = match self
            .get_json::<OccupationInfo>(&occupation_path(code), &[])
            .await
        {
            Ok(info) => info.bright_outlook(),
            Err(e) => {
                warn!(code = %code, error = %e, "Outlook lookup failed, assuming none");
                false
            }
        };

        Ok(CompetencyProfile {
            code: code.to_string(),
            title: info.title,
            description: info.description,
            job_zone: job_zone.zone(),
            bright_outlook,
            skills: skills.into_items(CompetencyKind::Skill),
            knowledge: knowledge.into_items(CompetencyKind::Knowledge),
            abilities: abilities.into_items(CompetencyKind::Ability),
            technology_skills: technology.into_skills(),
            tasks: tasks.into_tasks(),
            education,
        })
    }
}

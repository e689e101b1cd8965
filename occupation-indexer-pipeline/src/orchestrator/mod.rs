//! Orchestrator module for the occupation indexer pipeline.
//!
//! Coordinates the sources, transformer, aggregator and loader over one run.
//! Only provisioning and the national extract can abort a run; everything
//! else degrades into counters on the returned report.

mod report;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn, Span};
use uuid::Uuid;

use crate::aggregator::SkillAggregator;
use crate::errors::PipelineError;
use crate::loader::{DocumentLoader, LoadResult, LoaderConfig};
use crate::transformer::{CompetencyFields, DocumentTransformer};
use occupation_indexer_repository::collections::{
    all_schemas, occupations_schema, LOCATION_WAGES, OCCUPATIONS, SKILLS,
};
use occupation_indexer_repository::{DocumentStore, SearchRequest};
use occupation_indexer_shared::{
    normalize_soc_code, to_versioned_code, try_normalize_soc_code, CompetencyProfile, Granularity,
    OccupationDocument,
};
use occupation_indexer_sources::{CompetencySource, TabularSource};

pub use report::{
    CollectionStatus, PipelineStatus, RefreshReport, UpdateReport, WageRefreshReport,
};

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Year of the tabular dataset, stamped on location documents.
    pub data_year: i32,
    /// Log competency progress every this many occupations.
    pub progress_interval: usize,
    /// Page size when listing indexed occupations.
    pub update_page_size: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            data_year: 2024,
            progress_interval: 50,
            update_page_size: 250,
        }
    }
}

/// Stage switches of a full refresh.
#[derive(Debug, Clone)]
pub struct RefreshOptions {
    /// Drop and recreate every collection before loading.
    pub drop_existing: bool,
    pub include_competency: bool,
    pub include_location_wages: bool,
    /// Cap on the number of competency profiles fetched.
    pub max_occupations: Option<usize>,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            drop_existing: false,
            include_competency: true,
            include_location_wages: true,
            max_occupations: None,
        }
    }
}

impl RefreshOptions {
    /// Options of a capped test run.
    pub fn partial(max_occupations: usize) -> Self {
        Self {
            max_occupations: Some(max_occupations),
            ..Default::default()
        }
    }
}

/// Orchestrator that coordinates the pipeline components.
///
/// Every call runs its stages one after another on the calling task; the
/// sources rate limit themselves.
pub struct Orchestrator {
    tabular: Arc<dyn TabularSource>,
    competency: Arc<dyn CompetencySource>,
    store: Arc<dyn DocumentStore>,
    loader: DocumentLoader,
    transformer: DocumentTransformer,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with the default configuration.
    pub fn new(
        tabular: Arc<dyn TabularSource>,
        competency: Arc<dyn CompetencySource>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self::with_config(
            tabular,
            competency,
            store,
            LoaderConfig::default(),
            OrchestratorConfig::default(),
        )
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        tabular: Arc<dyn TabularSource>,
        competency: Arc<dyn CompetencySource>,
        store: Arc<dyn DocumentStore>,
        loader_config: LoaderConfig,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            loader: DocumentLoader::with_config(store.clone(), loader_config),
            transformer: DocumentTransformer::new(config.data_year),
            tabular,
            competency,
            store,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run the whole pipeline: provision, extract, transform and load all
    /// three collections.
    ///
    /// # Returns
    ///
    /// * `Ok(RefreshReport)` - Per-stage counts, also when some stages failed
    /// * `Err(PipelineError)` - If provisioning or the national extract failed
    #[instrument(skip(self), fields(run_id = tracing::field::Empty))]
    pub async fn run_full_refresh(
        &self,
        options: RefreshOptions,
    ) -> Result<RefreshReport, PipelineError> {
        let run_id = Uuid::new_v4();
        Span::current().record("run_id", tracing::field::display(run_id));
        let started = Utc::now();
        info!("Starting full refresh");

        self.provision(options.drop_existing).await?;

        let rows = self
            .tabular
            .fetch_rows(Granularity::National, self.config.data_year)
            .await?;
        info!(count = rows.len(), "Fetched national rows");

        let mut codes = Vec::new();
        let mut seen = HashSet::new();
        for row in &rows {
            match try_normalize_soc_code(&row.occ_code) {
                Ok(code) => {
                    if seen.insert(code.clone()) {
                        codes.push(code);
                    }
                }
                Err(e) => {
                    let err = PipelineError::from(e);
                    debug!(error = %err, "Row left out of competency fetch");
                }
            }
        }

        let mut profiles = HashMap::new();
        let mut competency_failures = 0;
        if options.include_competency {
            let limit = options.max_occupations.unwrap_or(codes.len());
            let targets = &codes[..limit.min(codes.len())];
            (profiles, competency_failures) = self.fetch_profiles(targets).await;
        }

        let documents: Vec<OccupationDocument> = rows
            .iter()
            .map(|row| {
                let profile = profiles.get(&normalize_soc_code(&row.occ_code));
                self.transformer.transform_occupation(row, profile)
            })
            .collect();
        let occupations = self.loader.load(OCCUPATIONS, &documents).await;

        let (state_wages, metro_wages) = if options.include_location_wages {
            (
                Some(self.load_location_wages(Granularity::State).await),
                Some(self.load_location_wages(Granularity::Metro).await),
            )
        } else {
            (None, None)
        };

        let skills = if options.include_competency && !profiles.is_empty() {
            let mut aggregator = SkillAggregator::new();
            for code in &codes {
                if let Some(profile) = profiles.get(code) {
                    aggregator.add_profile(code, profile);
                }
            }
            let skill_documents = aggregator.build(&self.transformer);
            info!(count = skill_documents.len(), "Built skill documents");
            Some(self.loader.load(SKILLS, &skill_documents).await)
        } else {
            None
        };

        let completed = Utc::now();
        let report = RefreshReport {
            run_id,
            started,
            completed,
            duration_seconds: (completed - started).num_milliseconds() as f64 / 1000.0,
            partial: options.max_occupations.is_some(),
            national_records: rows.len(),
            competency_profiles_loaded: profiles.len(),
            competency_failures,
            occupations,
            state_wages,
            metro_wages,
            skills,
        };
        info!(
            duration_seconds = report.duration_seconds,
            occupations = report.occupations.success,
            "Full refresh completed"
        );
        Ok(report)
    }

    /// Re-fetch competency profiles and merge them into indexed occupations.
    ///
    /// Wage fields of the stored documents are left as they are.
    ///
    /// # Arguments
    ///
    /// * `codes` - Occupation codes to update, or `None` for every indexed one
    #[instrument(skip(self, codes), fields(run_id = tracing::field::Empty))]
    pub async fn update_competency_data(
        &self,
        codes: Option<Vec<String>>,
    ) -> Result<UpdateReport, PipelineError> {
        let run_id = Uuid::new_v4();
        Span::current().record("run_id", tracing::field::display(run_id));
        let started = Utc::now();

        let codes = match codes {
            Some(codes) => codes,
            None => self.indexed_codes().await?,
        };
        info!(count = codes.len(), "Updating competency data");

        let mut failed = 0;
        let mut missing = 0;
        let mut documents = Vec::new();
        for raw in &codes {
            let code = match try_normalize_soc_code(raw) {
                Ok(code) => code,
                Err(e) => {
                    warn!(error = %PipelineError::from(e), "Skipping code");
                    failed += 1;
                    continue;
                }
            };

            let mut document = match self.stored_occupation(&code).await {
                Ok(Some(document)) => document,
                Ok(None) => {
                    debug!(soc_code = %code, "Occupation not indexed");
                    missing += 1;
                    continue;
                }
                Err(e) => {
                    warn!(soc_code = %code, error = %e, "Failed to read occupation");
                    failed += 1;
                    continue;
                }
            };

            match self.competency.fetch_profile(&to_versioned_code(&code)).await {
                Ok(profile) => {
                    CompetencyFields::from_profile(&profile).apply_to(&mut document);
                    document.last_updated = Utc::now().timestamp();
                    documents.push(document);
                }
                Err(e) => {
                    let err = PipelineError::from(e);
                    warn!(soc_code = %code, error = %err, "Profile fetch failed");
                    failed += 1;
                }
            }
        }

        let load = self.loader.load(OCCUPATIONS, &documents).await;

        let report = UpdateReport {
            run_id,
            started,
            completed: Utc::now(),
            requested: codes.len(),
            updated: load.success,
            failed: failed + load.failed,
            missing,
        };
        info!(
            updated = report.updated,
            failed = report.failed,
            missing = report.missing,
            "Competency update completed"
        );
        Ok(report)
    }

    /// Reload national wages, keeping the competency fields already indexed.
    #[instrument(skip(self), fields(run_id = tracing::field::Empty))]
    pub async fn refresh_national_wages(&self) -> Result<WageRefreshReport, PipelineError> {
        let run_id = Uuid::new_v4();
        Span::current().record("run_id", tracing::field::display(run_id));
        let started = Utc::now();

        self.store
            .create_collection(&occupations_schema(), false)
            .await?;
        let previous_count = self.document_count(OCCUPATIONS).await?;

        let rows = self
            .tabular
            .fetch_rows(Granularity::National, self.config.data_year)
            .await?;
        info!(count = rows.len(), previous_count, "Fetched national rows");

        let mut preserved = 0;
        let mut skipped = 0;
        let mut documents = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut document = self.transformer.transform_occupation(row, None);
            match self.stored_occupation(&document.id).await {
                Ok(Some(existing)) if existing.has_competency_data() => {
                    CompetencyFields::from_document(&existing).apply_to(&mut document);
                    preserved += 1;
                }
                Ok(_) => {}
                Err(e) => {
                    // Writing a wage-only document here would drop its competency fields.
                    warn!(soc_code = %document.id, error = %e, "Skipping occupation");
                    skipped += 1;
                    continue;
                }
            }
            documents.push(document);
        }

        let mut occupations = self.loader.load(OCCUPATIONS, &documents).await;
        occupations.failed += skipped;
        // Store counts lag behind a bulk write until the index refreshes.
        let new_count = rows.len() as u64;

        let report = WageRefreshReport {
            run_id,
            started,
            completed: Utc::now(),
            previous_count,
            new_count,
            national_records: rows.len(),
            preserved_competency: preserved,
            occupations,
        };
        info!(
            previous_count,
            new_count,
            preserved,
            "National wage refresh completed"
        );
        Ok(report)
    }

    /// Store health and document counts. Never fails: unreachable parts are
    /// reported as unhealthy or unknown.
    pub async fn pipeline_status(&self) -> PipelineStatus {
        let store_healthy = match self.store.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!(error = %e, "Store health check failed");
                false
            }
        };

        let mut collections = Vec::new();
        for name in [OCCUPATIONS, LOCATION_WAGES, SKILLS] {
            let num_documents = match self.store.collection_stats(name).await {
                Ok(stats) => stats.map(|s| s.num_documents),
                Err(e) => {
                    warn!(collection = name, error = %e, "Failed to read collection stats");
                    None
                }
            };
            collections.push(CollectionStatus {
                name: name.to_string(),
                num_documents,
            });
        }

        PipelineStatus {
            store_healthy,
            collections,
            data_year: self.config.data_year,
            last_check: Utc::now(),
        }
    }

    async fn provision(&self, drop_existing: bool) -> Result<(), PipelineError> {
        for schema in all_schemas() {
            self.store.create_collection(&schema, drop_existing).await?;
            debug!(collection = schema.name, drop_existing, "Collection ready");
        }
        Ok(())
    }

    /// Fetch profiles one after another, skipping occupations whose fetch
    /// fails.
    async fn fetch_profiles(
        &self,
        codes: &[String],
    ) -> (HashMap<String, CompetencyProfile>, usize) {
        let mut profiles = HashMap::with_capacity(codes.len());
        let mut failures = 0;
        let interval = self.config.progress_interval.max(1);

        for (i, code) in codes.iter().enumerate() {
            match self.competency.fetch_profile(&to_versioned_code(code)).await {
                Ok(profile) => {
                    profiles.insert(code.clone(), profile);
                }
                Err(e) => {
                    let err = PipelineError::from(e);
                    warn!(soc_code = %code, error = %err, "Skipping competency data");
                    failures += 1;
                }
            }
            if (i + 1) % interval == 0 {
                info!(processed = i + 1, total = codes.len(), "Competency fetch progress");
            }
        }

        info!(loaded = profiles.len(), failures, "Competency fetch completed");
        (profiles, failures)
    }

    /// Extract, transform and load one location granularity. Failures come
    /// back as a stage-failed result.
    async fn load_location_wages(&self, granularity: Granularity) -> LoadResult {
        let rows = match self
            .tabular
            .fetch_rows(granularity, self.config.data_year)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                let err = PipelineError::from(e);
                warn!(granularity = %granularity, error = %err, "Location wages unavailable");
                return LoadResult::stage_failed(err.to_string());
            }
        };

        let documents: Vec<_> = rows
            .iter()
            .map(|row| self.transformer.transform_wage_by_location(row, granularity))
            .collect();
        info!(granularity = %granularity, count = documents.len(), "Loading location wages");
        self.loader.load(LOCATION_WAGES, &documents).await
    }

    async fn stored_occupation(
        &self,
        code: &str,
    ) -> Result<Option<OccupationDocument>, PipelineError> {
        let Some(value) = self.store.get_document(OCCUPATIONS, code).await? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| PipelineError::invalid_document(code, e.to_string()))
    }

    async fn document_count(&self, collection: &str) -> Result<u64, PipelineError> {
        Ok(self
            .store
            .collection_stats(collection)
            .await?
            .map_or(0, |stats| stats.num_documents))
    }

    /// Every occupation id in the store, gathered page by page.
    async fn indexed_codes(&self) -> Result<Vec<String>, PipelineError> {
        let per_page = self.config.update_page_size.max(1);
        let mut codes = Vec::new();
        let mut page = 1;

        loop {
            let request = SearchRequest::match_all().page(page, per_page);
            let response = self.store.search(OCCUPATIONS, &request).await?;
            if response.hits.is_empty() {
                break;
            }
            codes.extend(response.hits.into_iter().map(|hit| hit.id));
            if codes.len() as u64 >= response.found {
                break;
            }
            page += 1;
        }

        debug!(count = codes.len(), "Listed indexed occupations");
        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockCompetency, MockStore, MockTabular};
    use occupation_indexer_shared::{
        CompetencyItem, CompetencyKind, EducationLevel, TabularOccupationRow, TabularValue, Task,
        NOT_SPECIFIED,
    };
    use serde_json::Value;

    fn national_row(code: &str, title: &str, employment: f64, median: f64) -> TabularOccupationRow {
        TabularOccupationRow {
            occ_code: code.to_string(),
            occ_title: title.to_string(),
            o_group: Some("detailed".to_string()),
            tot_emp: TabularValue::Number(employment),
            a_median: TabularValue::Number(median),
            ..Default::default()
        }
    }

    fn area_row(code: &str, area: &str, area_title: &str) -> TabularOccupationRow {
        TabularOccupationRow {
            occ_code: code.to_string(),
            occ_title: "Software Developers".to_string(),
            area: Some(area.to_string()),
            area_title: Some(area_title.to_string()),
            tot_emp: TabularValue::from("1,200"),
            ..Default::default()
        }
    }

    fn skill(id: &str, name: &str, importance: f64, level: Option<f64>) -> CompetencyItem {
        CompetencyItem {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            importance,
            level,
            kind: CompetencyKind::Skill,
        }
    }

    fn profile(code: &str, title: &str, skills: Vec<CompetencyItem>) -> CompetencyProfile {
        CompetencyProfile {
            code: code.to_string(),
            title: title.to_string(),
            description: format!("{} do things.", title),
            job_zone: 4,
            skills,
            education: vec![EducationLevel {
                name: "Bachelor's degree".to_string(),
                percentage: 70.0,
            }],
            ..Default::default()
        }
    }

    fn orchestrator(
        tabular: MockTabular,
        competency: Arc<MockCompetency>,
        store: Arc<MockStore>,
    ) -> Orchestrator {
        Orchestrator::with_config(
            Arc::new(tabular),
            competency,
            store,
            LoaderConfig { batch_size: 2 },
            OrchestratorConfig {
                data_year: 2023,
                progress_interval: 1,
                update_page_size: 2,
            },
        )
    }

    async fn stored(store: &MockStore, collection: &str, id: &str) -> Value {
        store.document(collection, id).await.unwrap()
    }

    #[tokio::test]
    async fn test_wage_only_refresh() {
        let tabular = MockTabular::new().with_rows(
            Granularity::National,
            vec![national_row("151252", "Test Analysts", 1000.0, 75000.0)],
        );
        let store = Arc::new(MockStore::new());
        let orchestrator = orchestrator(tabular, Arc::new(MockCompetency::new()), store.clone());

        let report = orchestrator
            .run_full_refresh(RefreshOptions {
                include_competency: false,
                include_location_wages: false,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(report.national_records, 1);
        assert_eq!(report.occupations.success, 1);
        assert!(report.skills.is_none());
        assert!(report.state_wages.is_none());
        assert!(!report.partial);

        let doc = stored(&store, OCCUPATIONS, "15-1252").await;
        assert_eq!(doc["soc_code"], "15-1252");
        assert_eq!(doc["national_employment"], 1000);
        assert_eq!(doc["national_median_wage"], 75000.0);
        assert_eq!(doc["skills"], serde_json::json!([]));
        assert_eq!(store.created_collections().await.len(), 3);
    }

    #[tokio::test]
    async fn test_full_refresh_with_profile_failure() {
        let tabular = MockTabular::new()
            .with_rows(
                Granularity::National,
                vec![
                    national_row("15-1252", "Software Developers", 1_500_000.0, 130_000.0),
                    national_row("29-1141", "Registered Nurses", 3_000_000.0, 86_000.0),
                    national_row("99-9999", "Unknown", 10.0, 0.0),
                ],
            )
            .with_rows(
                Granularity::State,
                vec![area_row("15-1252", "06", "California")],
            )
            .unavailable(Granularity::Metro);
        let competency = Arc::new(
            MockCompetency::new()
                .with_profile(profile(
                    "15-1252.00",
                    "Software Developers",
                    vec![skill("2.A.1.a", "Reading Comprehension", 4.0, Some(5.0))],
                ))
                .with_profile(profile(
                    "29-1141.00",
                    "Registered Nurses",
                    vec![skill("2.A.1.a", "Reading Comprehension", 2.0, None)],
                )),
        );
        let store = Arc::new(MockStore::new());
        let orchestrator = orchestrator(tabular, competency.clone(), store.clone());

        let report = orchestrator
            .run_full_refresh(RefreshOptions::default())
            .await
            .unwrap();

        assert_eq!(report.competency_profiles_loaded, 2);
        assert_eq!(report.competency_failures, 1);
        assert_eq!(report.occupations.success, 3);
        assert_eq!(report.state_wages.as_ref().map(|r| r.success), Some(1));
        let metro = report.metro_wages.unwrap();
        assert_eq!(metro.success, 0);
        assert!(metro.error.unwrap().contains("metro"));
        assert_eq!(report.skills.map(|r| r.success), Some(1));

        let unknown = stored(&store, OCCUPATIONS, "99-9999").await;
        assert_eq!(unknown["education_level"], NOT_SPECIFIED);
        let developers = stored(&store, OCCUPATIONS, "15-1252").await;
        assert_eq!(developers["education_level"], "Bachelor's degree");
        assert_eq!(developers["skill_names"][0], "Reading Comprehension");

        let wage = stored(&store, LOCATION_WAGES, "15-1252_06").await;
        assert_eq!(wage["employment"], 1200);
        assert_eq!(wage["data_year"], 2023);

        let reading = stored(&store, SKILLS, "2.A.1.a").await;
        assert_eq!(reading["occupation_count"], 2);
        assert_eq!(reading["avg_importance"], 3.0);
        assert_eq!(reading["avg_level"], 5.0);
        assert_eq!(reading["related_occupations"][0]["occupation_code"], "15-1252");

        assert_eq!(
            competency.requested().await,
            vec!["15-1252.00", "29-1141.00", "99-9999.00"]
        );
    }

    #[tokio::test]
    async fn test_national_source_unavailable_aborts() {
        let tabular = MockTabular::new().unavailable(Granularity::National);
        let store = Arc::new(MockStore::new());
        let orchestrator = orchestrator(tabular, Arc::new(MockCompetency::new()), store.clone());

        let err = orchestrator
            .run_full_refresh(RefreshOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::SourceUnavailable(_)));
        assert_eq!(store.document_count(OCCUPATIONS).await, 0);
    }

    #[tokio::test]
    async fn test_partial_refresh_caps_profile_fetches() {
        let rows = (1..=5)
            .map(|i| national_row(&format!("11-100{}", i), "Managers", 100.0, 100_000.0))
            .collect();
        let tabular = MockTabular::new().with_rows(Granularity::National, rows);
        let competency = Arc::new(MockCompetency::new());
        let store = Arc::new(MockStore::new());
        let orchestrator = orchestrator(tabular, competency.clone(), store.clone());

        let report = orchestrator
            .run_full_refresh(RefreshOptions {
                include_location_wages: false,
                ..RefreshOptions::partial(2)
            })
            .await
            .unwrap();

        assert!(report.partial);
        assert_eq!(competency.requested().await.len(), 2);
        assert_eq!(report.occupations.success, 5);
        assert!(report.skills.is_none());
    }

    #[tokio::test]
    async fn test_update_merges_competency_into_existing_document() {
        let tabular = MockTabular::new().with_rows(
            Granularity::National,
            vec![
                national_row("15-1252", "Software Developers", 1_500_000.0, 130_000.0),
                national_row("29-1141", "Registered Nurses", 3_000_000.0, 86_000.0),
                national_row("11-1011", "Chief Executives", 200_000.0, 206_000.0),
            ],
        );
        let competency = Arc::new(MockCompetency::new().with_profile(profile(
            "15-1252.00",
            "Software Developers",
            vec![skill("2.A.1.a", "Reading Comprehension", 4.0, Some(5.0))],
        )));
        let store = Arc::new(MockStore::new());
        let orchestrator = orchestrator(tabular, competency, store.clone());
        orchestrator
            .run_full_refresh(RefreshOptions {
                include_competency: false,
                include_location_wages: false,
                ..Default::default()
            })
            .await
            .unwrap();

        let report = orchestrator
            .update_competency_data(Some(vec![
                "151252".to_string(),
                "29-1141".to_string(),
                "47-2061".to_string(),
            ]))
            .await
            .unwrap();

        assert_eq!(report.requested, 3);
        assert_eq!(report.updated, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.missing, 1);

        let doc = stored(&store, OCCUPATIONS, "15-1252").await;
        assert_eq!(doc["national_median_wage"], 130_000.0);
        assert_eq!(doc["job_zone"], 4);
        assert_eq!(doc["skills"][0]["id"], "2.A.1.a");
    }

    #[tokio::test]
    async fn test_update_without_codes_walks_every_indexed_occupation() {
        let rows = vec![
            national_row("11-1011", "Chief Executives", 1.0, 1.0),
            national_row("15-1252", "Software Developers", 1.0, 1.0),
            national_row("29-1141", "Registered Nurses", 1.0, 1.0),
        ];
        let tabular = MockTabular::new().with_rows(Granularity::National, rows);
        let competency = Arc::new(MockCompetency::new());
        let store = Arc::new(MockStore::new());
        let orchestrator = orchestrator(tabular, competency.clone(), store.clone());
        orchestrator
            .run_full_refresh(RefreshOptions {
                include_competency: false,
                include_location_wages: false,
                ..Default::default()
            })
            .await
            .unwrap();

        let report = orchestrator.update_competency_data(None).await.unwrap();

        assert_eq!(report.requested, 3);
        assert_eq!(report.failed, 3);
        assert_eq!(
            competency.requested().await,
            vec!["11-1011.00", "15-1252.00", "29-1141.00"]
        );
    }

    #[tokio::test]
    async fn test_wage_refresh_keeps_competency_fields() {
        let tabular = MockTabular::new().with_rows(
            Granularity::National,
            vec![
                national_row("15-1252", "Software Developers", 1_600_000.0, 135_000.0),
                national_row("29-1141", "Registered Nurses", 3_100_000.0, 90_000.0),
            ],
        );
        let store = Arc::new(MockStore::new());
        let orchestrator = orchestrator(tabular, Arc::new(MockCompetency::new()), store.clone());

        let mut existing = orchestrator.transformer.transform_occupation(
            &national_row("15-1252", "Software Developers", 1_500_000.0, 130_000.0),
            Some(&profile(
                "15-1252.00",
                "Software Developers",
                vec![skill("2.A.1.a", "Reading Comprehension", 4.0, Some(5.0))],
            )),
        );
        existing.last_updated = 1;
        store
            .insert(OCCUPATIONS, "15-1252", serde_json::to_value(&existing).unwrap())
            .await;

        let report = orchestrator.refresh_national_wages().await.unwrap();

        assert_eq!(report.previous_count, 1);
        assert_eq!(report.new_count, 2);
        assert_eq!(report.preserved_competency, 1);
        assert_eq!(report.occupations.success, 2);
        assert_eq!(report.occupations.failed, 0);

        let doc = stored(&store, OCCUPATIONS, "15-1252").await;
        assert_eq!(doc["national_median_wage"], 135_000.0);
        assert_eq!(doc["skill_names"][0], "Reading Comprehension");
        assert_eq!(doc["job_zone"], 4);
    }

    #[tokio::test]
    async fn test_wage_refresh_keeps_profile_without_elements() {
        let tabular = MockTabular::new().with_rows(
            Granularity::National,
            vec![national_row("15-1252", "Software Developers", 1_600_000.0, 135_000.0)],
        );
        let store = Arc::new(MockStore::new());
        let orchestrator = orchestrator(tabular, Arc::new(MockCompetency::new()), store.clone());

        let mut existing = orchestrator.transformer.transform_occupation(
            &national_row("15-1252", "Software Developers", 1_500_000.0, 130_000.0),
            Some(&CompetencyProfile {
                code: "15-1252.00".to_string(),
                description: "Develop software.".to_string(),
                job_zone: 4,
                tasks: vec![Task {
                    id: "1".to_string(),
                    description: "Write code.".to_string(),
                    importance: 4.0,
                }],
                ..Default::default()
            }),
        );
        existing.last_updated = 1;
        store
            .insert(OCCUPATIONS, "15-1252", serde_json::to_value(&existing).unwrap())
            .await;

        let report = orchestrator.refresh_national_wages().await.unwrap();

        assert_eq!(report.preserved_competency, 1);
        let doc = stored(&store, OCCUPATIONS, "15-1252").await;
        assert_eq!(doc["national_median_wage"], 135_000.0);
        assert_eq!(doc["description"], "Develop software.");
        assert_eq!(doc["job_zone"], 4);
        assert_eq!(doc["tasks"][0], "Write code.");
    }

    #[tokio::test]
    async fn test_wage_refresh_counts_fresh_rows_while_store_lags() {
        let tabular = MockTabular::new().with_rows(
            Granularity::National,
            vec![
                national_row("15-1252", "Software Developers", 1_600_000.0, 135_000.0),
                national_row("29-1141", "Registered Nurses", 3_100_000.0, 90_000.0),
                national_row("11-1011", "Chief Executives", 210_000.0, 206_000.0),
            ],
        );
        let store = Arc::new(MockStore::new().lagging_stats());
        let orchestrator = orchestrator(tabular, Arc::new(MockCompetency::new()), store.clone());
        let existing = orchestrator.transformer.transform_occupation(
            &national_row("15-1252", "Software Developers", 1_500_000.0, 130_000.0),
            None,
        );
        store
            .insert(OCCUPATIONS, "15-1252", serde_json::to_value(&existing).unwrap())
            .await;

        let report = orchestrator.refresh_national_wages().await.unwrap();

        assert_eq!(report.previous_count, 1);
        assert_eq!(report.new_count, 3);
        assert_eq!(report.national_records, 3);
        assert_eq!(report.occupations.success, 3);
        assert_eq!(store.document_count(OCCUPATIONS).await, 3);
    }

    #[tokio::test]
    async fn test_pipeline_status() {
        let store = Arc::new(MockStore::new());
        store
            .insert(SKILLS, "2.A.1.a", serde_json::json!({ "id": "2.A.1.a" }))
            .await;
        let orchestrator = orchestrator(MockTabular::new(), Arc::new(MockCompetency::new()), store);

        let status = orchestrator.pipeline_status().await;

        assert!(status.store_healthy);
        assert_eq!(status.data_year, 2023);
        assert_eq!(
            status.collections,
            vec![
                CollectionStatus { name: OCCUPATIONS.to_string(), num_documents: None },
                CollectionStatus { name: LOCATION_WAGES.to_string(), num_documents: None },
                CollectionStatus { name: SKILLS.to_string(), num_documents: Some(1) },
            ]
        );
    }
}

//! Documents stored in the search index.
//!
//! One record type per collection. Every document carries its own primary
//! key in `id` so that re-running the pipeline overwrites instead of
//! duplicating.

use serde::{Deserialize, Serialize};

/// Placeholder for derived text fields with no source data.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Anything that can be upserted into a collection by id.
pub trait IndexDocument: Serialize {
    /// Primary key of the document within its collection.
    fn document_id(&self) -> &str;
}

/// A competency item as embedded in an occupation document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: f64,
    /// Level with "not measured" stored as 0.0.
    pub level: f64,
    /// `skill`, `knowledge` or `ability`.
    pub category: String,
}

/// The searchable unit for one occupation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupationDocument {
    pub id: String,
    pub soc_code: String,
    pub onet_code: String,
    pub title: String,
    #[serde(default)]
    pub occupation_group: String,

    pub national_employment: i64,
    pub national_mean_wage: f64,
    pub national_median_wage: f64,
    pub hourly_mean_wage: f64,
    pub hourly_median_wage: f64,

    pub wage_pct_10: f64,
    pub wage_pct_25: f64,
    pub wage_pct_75: f64,
    pub wage_pct_90: f64,
    pub hourly_pct_10: f64,
    pub hourly_pct_25: f64,
    pub hourly_pct_75: f64,
    pub hourly_pct_90: f64,

    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub job_zone: u8,
    #[serde(default = "not_specified")]
    pub education_level: String,
    #[serde(default = "not_specified")]
    pub experience_required: String,
    #[serde(default)]
    pub bright_outlook: bool,

    #[serde(default)]
    pub skills: Vec<CompetencyEntry>,
    #[serde(default)]
    pub knowledge_areas: Vec<CompetencyEntry>,
    #[serde(default)]
    pub abilities: Vec<CompetencyEntry>,

    #[serde(default)]
    pub technology_skills: Vec<String>,
    #[serde(default)]
    pub hot_technologies: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<String>,

    #[serde(default)]
    pub skill_names: Vec<String>,
    #[serde(default)]
    pub knowledge_names: Vec<String>,
    #[serde(default)]
    pub ability_names: Vec<String>,

    /// Unix timestamp (seconds) of the transform that produced this document.
    pub last_updated: i64,
}

impl OccupationDocument {
    /// Whether any competency data has been merged into this document.
    ///
    /// A profile may carry a description, job zone or tasks while its
    /// element lists are empty, so each of those counts on its own.
    pub fn has_competency_data(&self) -> bool {
        !self.skills.is_empty()
            || !self.knowledge_areas.is_empty()
            || !self.abilities.is_empty()
            || !self.technology_skills.is_empty()
            || !self.tasks.is_empty()
            || !self.description.is_empty()
            || self.job_zone != 0
    }
}

impl IndexDocument for OccupationDocument {
    fn document_id(&self) -> &str {
        &self.id
    }
}

/// Wage and employment figures for one occupation in one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationWageDocument {
    /// `{soc_code}_{area_code}`.
    pub id: String,
    pub soc_code: String,
    pub occupation_title: String,

    /// `state` or `metro`.
    pub area_type: String,
    pub area_code: String,
    pub area_title: String,
    pub state_code: String,
    pub state_name: String,

    pub employment: i64,
    pub employment_per_1000: f64,
    pub location_quotient: f64,

    pub hourly_mean_wage: f64,
    pub hourly_median_wage: f64,
    pub hourly_pct_10: f64,
    pub hourly_pct_25: f64,
    pub hourly_pct_75: f64,
    pub hourly_pct_90: f64,

    pub annual_mean_wage: f64,
    pub annual_median_wage: f64,
    pub annual_pct_10: f64,
    pub annual_pct_25: f64,
    pub annual_pct_75: f64,
    pub annual_pct_90: f64,

    pub data_year: i32,
    pub last_updated: i64,
}

impl IndexDocument for LocationWageDocument {
    fn document_id(&self) -> &str {
        &self.id
    }
}

/// One occupation that uses a given competency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedOccupation {
    /// Canonical SOC code of the occupation.
    pub occupation_code: String,
    pub title: String,
    pub importance: f64,
    pub level: Option<f64>,
}

/// A competency rolled up across every occupation that reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDocument {
    pub id: String,
    pub skill_id: String,
    pub skill_name: String,
    pub skill_type: String,
    pub description: String,
    pub category: String,
    /// Truncated list; see `occupation_count` for the true total.
    pub related_occupations: Vec<RelatedOccupation>,
    pub occupation_count: usize,
    pub avg_importance: f64,
    pub avg_level: f64,
    pub last_updated: i64,
}

impl IndexDocument for SkillDocument {
    fn document_id(&self) -> &str {
        &self.id
    }
}

fn not_specified() -> String {
    NOT_SPECIFIED.to_string()
}

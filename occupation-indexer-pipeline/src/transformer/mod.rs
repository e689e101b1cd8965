//! Canonical document transformer.
//!
//! Turns raw tabular rows and competency profiles into the documents stored
//! in the three collections.

mod coerce;
mod competency;

use chrono::Utc;

use occupation_indexer_shared::{
    normalize_soc_code, to_versioned_code, CompetencyKind, CompetencyProfile, Granularity,
    LocationWageDocument, OccupationDocument, RelatedOccupation, SkillDocument,
    TabularOccupationRow, NOT_SPECIFIED,
};

pub use coerce::{coerce_f64, coerce_i64, SUPPRESSION_MARKERS};
pub use competency::{education_level, experience_for_job_zone, CompetencyFields, MAX_TASKS};

/// Related occupations stored per skill document.
pub const MAX_RELATED_OCCUPATIONS: usize = 50;

/// Category for skill ids without a known taxonomy prefix.
pub const GENERAL_CATEGORY: &str = "General";

/// Transformer that builds index documents.
///
/// Stateless apart from the data year stamped on location documents.
#[derive(Debug, Clone)]
pub struct DocumentTransformer {
    data_year: i32,
}

impl DocumentTransformer {
    pub fn new(data_year: i32) -> Self {
        Self { data_year }
    }

    pub fn data_year(&self) -> i32 {
        self.data_year
    }

    /// Merge one national row with an optional competency profile.
    ///
    /// A missing profile leaves every competency field at its default; that
    /// is not an error.
    pub fn transform_occupation(
        &self,
        row: &TabularOccupationRow,
        profile: Option<&CompetencyProfile>,
    ) -> OccupationDocument {
        let soc_code = normalize_soc_code(&row.occ_code);

        let mut document = OccupationDocument {
            id: soc_code.clone(),
            onet_code: to_versioned_code(&soc_code),
            soc_code,
            title: row.occ_title.clone(),
            occupation_group: row
                .o_group
                .clone()
                .unwrap_or_else(|| "detailed".to_string()),
            national_employment: coerce_i64(&row.tot_emp),
            national_mean_wage: coerce_f64(&row.a_mean),
            national_median_wage: coerce_f64(&row.a_median),
            hourly_mean_wage: coerce_f64(&row.h_mean),
            hourly_median_wage: coerce_f64(&row.h_median),
            wage_pct_10: coerce_f64(&row.a_pct10),
            wage_pct_25: coerce_f64(&row.a_pct25),
            wage_pct_75: coerce_f64(&row.a_pct75),
            wage_pct_90: coerce_f64(&row.a_pct90),
            hourly_pct_10: coerce_f64(&row.h_pct10),
            hourly_pct_25: coerce_f64(&row.h_pct25),
            hourly_pct_75: coerce_f64(&row.h_pct75),
            hourly_pct_90: coerce_f64(&row.h_pct90),
            description: String::new(),
            job_zone: 0,
            education_level: NOT_SPECIFIED.to_string(),
            experience_required: NOT_SPECIFIED.to_string(),
            bright_outlook: false,
            skills: Vec::new(),
            knowledge_areas: Vec::new(),
            abilities: Vec::new(),
            technology_skills: Vec::new(),
            hot_technologies: Vec::new(),
            tasks: Vec::new(),
            skill_names: Vec::new(),
            knowledge_names: Vec::new(),
            ability_names: Vec::new(),
            last_updated: Utc::now().timestamp(),
        };

        if let Some(profile) = profile {
            CompetencyFields::from_profile(profile).apply_to(&mut document);
        }

        document
    }

    /// Build the wage document of one occupation in one state or metro area.
    pub fn transform_wage_by_location(
        &self,
        row: &TabularOccupationRow,
        granularity: Granularity,
    ) -> LocationWageDocument {
        let soc_code = normalize_soc_code(&row.occ_code);
        let area_code = row.area.clone().unwrap_or_default();
        let area_title = row.area_title.clone().unwrap_or_default();
        let is_state = granularity == Granularity::State;

        let state_code = if is_state {
            area_code.chars().take(2).collect()
        } else {
            String::new()
        };
        let state_name = if is_state {
            area_title.clone()
        } else {
            String::new()
        };

        LocationWageDocument {
            id: format!("{}_{}", soc_code, area_code),
            soc_code,
            occupation_title: row.occ_title.clone(),
            area_type: granularity.as_str().to_string(),
            area_code,
            area_title,
            state_code,
            state_name,
            employment: coerce_i64(&row.tot_emp),
            employment_per_1000: coerce_f64(&row.jobs_1000),
            location_quotient: coerce_f64(&row.loc_quotient),
            hourly_mean_wage: coerce_f64(&row.h_mean),
            hourly_median_wage: coerce_f64(&row.h_median),
            hourly_pct_10: coerce_f64(&row.h_pct10),
            hourly_pct_25: coerce_f64(&row.h_pct25),
            hourly_pct_75: coerce_f64(&row.h_pct75),
            hourly_pct_90: coerce_f64(&row.h_pct90),
            annual_mean_wage: coerce_f64(&row.a_mean),
            annual_median_wage: coerce_f64(&row.a_median),
            annual_pct_10: coerce_f64(&row.a_pct10),
            annual_pct_25: coerce_f64(&row.a_pct25),
            annual_pct_75: coerce_f64(&row.a_pct75),
            annual_pct_90: coerce_f64(&row.a_pct90),
            data_year: self.data_year,
            last_updated: Utc::now().timestamp(),
        }
    }

    /// Build the aggregate document of one competency.
    ///
    /// # Arguments
    ///
    /// * `skill_id` - Taxonomy element id, also the document id
    /// * `skill_name` - Display name
    /// * `skill_type` - Skill, knowledge or ability
    /// * `description` - Element description
    /// * `related_occupations` - Every occupation reporting the element
    ///
    /// # Returns
    ///
    /// The document with averages over the reporting occupations and the
    /// related list truncated to [`MAX_RELATED_OCCUPATIONS`].
    pub fn transform_skill_document(
        &self,
        skill_id: &str,
        skill_name: &str,
        skill_type: CompetencyKind,
        description: &str,
        mut related_occupations: Vec<RelatedOccupation>,
    ) -> SkillDocument {
        let avg_importance = average(
            related_occupations
                .iter()
                .map(|o| o.importance)
                .filter(|v| *v != 0.0),
        );
        let avg_level = average(
            related_occupations
                .iter()
                .filter_map(|o| o.level)
                .filter(|v| *v != 0.0),
        );

        let occupation_count = related_occupations.len();
        related_occupations.truncate(MAX_RELATED_OCCUPATIONS);

        SkillDocument {
            id: skill_id.to_string(),
            skill_id: skill_id.to_string(),
            skill_name: skill_name.to_string(),
            skill_type: skill_type.as_str().to_string(),
            description: description.to_string(),
            category: skill_category(skill_id).to_string(),
            related_occupations,
            occupation_count,
            avg_importance,
            avg_level,
            last_updated: Utc::now().timestamp(),
        }
    }
}

/// Mean rounded to two decimals, 0.0 for no values.
fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return 0.0;
    }
    ((sum / count as f64) * 100.0).round() / 100.0
}

/// Category of a taxonomy element from the first segment of its id.
pub fn skill_category(skill_id: &str) -> &'static str {
    let Some((prefix, _)) = skill_id.split_once('.') else {
        return GENERAL_CATEGORY;
    };
    match prefix {
        "1" => "Worker Characteristics",
        "2" => "Worker Requirements",
        "3" => "Experience Requirements",
        "4" => "Occupational Requirements",
        _ => GENERAL_CATEGORY,
    }
}

//! Occupation document fields derived from a competency profile.

use occupation_indexer_shared::{
    CompetencyEntry, CompetencyItem, CompetencyProfile, EducationLevel, OccupationDocument,
    NOT_SPECIFIED,
};

/// Tasks kept per occupation, in source order.
pub const MAX_TASKS: usize = 20;

/// Experience text for job zones 1 to 5.
const EXPERIENCE_BY_JOB_ZONE: [&str; 5] = [
    "None required",
    "Some prior experience helpful",
    "Previous work experience required",
    "Considerable work experience",
    "Extensive work experience required",
];

/// Every occupation document field that comes from the competency service.
///
/// Kept together so the full refresh, the incremental update and the wage
/// refresh all write the same set of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CompetencyFields {
    pub description: String,
    pub job_zone: u8,
    pub education_level: String,
    pub experience_required: String,
    pub bright_outlook: bool,
    pub skills: Vec<CompetencyEntry>,
    pub knowledge_areas: Vec<CompetencyEntry>,
    pub abilities: Vec<CompetencyEntry>,
    pub technology_skills: Vec<String>,
    pub hot_technologies: Vec<String>,
    pub tasks: Vec<String>,
    pub skill_names: Vec<String>,
    pub knowledge_names: Vec<String>,
    pub ability_names: Vec<String>,
}

impl CompetencyFields {
    /// Derive the fields from a fetched profile.
    pub fn from_profile(profile: &CompetencyProfile) -> Self {
        Self {
            description: profile.description.clone(),
            job_zone: profile.job_zone,
            education_level: education_level(&profile.education),
            experience_required: experience_for_job_zone(profile.job_zone).to_string(),
            bright_outlook: profile.bright_outlook,
            skills: entries(&profile.skills),
            knowledge_areas: entries(&profile.knowledge),
            abilities: entries(&profile.abilities),
            technology_skills: profile
                .technology_skills
                .iter()
                .map(|t| t.name.clone())
                .collect(),
            hot_technologies: profile
                .technology_skills
                .iter()
                .filter(|t| t.hot_technology)
                .map(|t| t.name.clone())
                .collect(),
            tasks: profile
                .tasks
                .iter()
                .take(MAX_TASKS)
                .map(|t| t.description.clone())
                .collect(),
            skill_names: names(&profile.skills),
            knowledge_names: names(&profile.knowledge),
            ability_names: names(&profile.abilities),
        }
    }

    /// Copy the fields out of an already stored document.
    pub fn from_document(document: &OccupationDocument) -> Self {
        Self {
            description: document.description.clone(),
            job_zone: document.job_zone,
            education_level: document.education_level.clone(),
            experience_required: document.experience_required.clone(),
            bright_outlook: document.bright_outlook,
            skills: document.skills.clone(),
            knowledge_areas: document.knowledge_areas.clone(),
            abilities: document.abilities.clone(),
            technology_skills: document.technology_skills.clone(),
            hot_technologies: document.hot_technologies.clone(),
            tasks: document.tasks.clone(),
            skill_names: document.skill_names.clone(),
            knowledge_names: document.knowledge_names.clone(),
            ability_names: document.ability_names.clone(),
        }
    }

    /// Overwrite the competency fields of a document, leaving wage fields alone.
    pub fn apply_to(self, document: &mut OccupationDocument) {
        document.description = self.description;
        document.job_zone = self.job_zone;
        document.education_level = self.education_level;
        document.experience_required = self.experience_required;
        document.bright_outlook = self.bright_outlook;
        document.skills = self.skills;
        document.knowledge_areas = self.knowledge_areas;
        document.abilities = self.abilities;
        document.technology_skills = self.technology_skills;
        document.hot_technologies = self.hot_technologies;
        document.tasks = self.tasks;
        document.skill_names = self.skill_names;
        document.knowledge_names = self.knowledge_names;
        document.ability_names = self.ability_names;
    }
}

fn entries(items: &[CompetencyItem]) -> Vec<CompetencyEntry> {
    items
        .iter()
        .map(|item| CompetencyEntry {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            importance: item.importance,
            level: item.level.unwrap_or(0.0),
            category: item.kind.as_str().to_string(),
        })
        .collect()
}

fn names(items: &[CompetencyItem]) -> Vec<String> {
    items.iter().map(|item| item.name.clone()).collect()
}

/// Name of the education bucket with the highest share; the first one wins a
/// tie.
pub fn education_level(levels: &[EducationLevel]) -> String {
    let mut best: Option<&EducationLevel> = None;
    for level in levels {
        if best.map_or(true, |b| level.percentage > b.percentage) {
            best = Some(level);
        }
    }
    match best {
        Some(level) => level.name.clone(),
        None => NOT_SPECIFIED.to_string(),
    }
}

/// Experience text for a job zone.
pub fn experience_for_job_zone(job_zone: u8) -> &'static str {
    match job_zone {
        1..=5 => EXPERIENCE_BY_JOB_ZONE[usize::from(job_zone) - 1],
        _ => NOT_SPECIFIED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(name: &str, percentage: f64) -> EducationLevel {
        EducationLevel {
            name: name.to_string(),
            percentage,
        }
    }

    #[test]
    fn test_education_level_picks_highest_share() {
        let levels = vec![
            level("High school diploma", 20.0),
            level("Bachelor's degree", 62.0),
            level("Master's degree", 18.0),
        ];
        assert_eq!(education_level(&levels), "Bachelor's degree");
    }

    #[test]
    fn test_education_level_tie_and_empty() {
        let levels = vec![level("Associate's degree", 40.0), level("Bachelor's degree", 40.0)];
        assert_eq!(education_level(&levels), "Associate's degree");
        assert_eq!(education_level(&[]), NOT_SPECIFIED);
    }

    #[test]
    fn test_experience_lookup() {
        assert_eq!(experience_for_job_zone(1), "None required");
        assert_eq!(experience_for_job_zone(4), "Considerable work experience");
        assert_eq!(experience_for_job_zone(5), "Extensive work experience required");
        assert_eq!(experience_for_job_zone(0), NOT_SPECIFIED);
        assert_eq!(experience_for_job_zone(6), NOT_SPECIFIED);
    }
}

//! Competency profiles fetched from the occupational competency service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which taxonomy a competency item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetencyKind {
    Skill,
    Knowledge,
    Ability,
}

impl CompetencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetencyKind::Skill => "skill",
            CompetencyKind::Knowledge => "knowledge",
            CompetencyKind::Ability => "ability",
        }
    }
}

impl fmt::Display for CompetencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A skill, knowledge area or ability as rated for one occupation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyItem {
    /// Taxonomy element id, e.g. `2.A.1.a`.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Importance on the 0-5 scale; 0.0 when the service reported none.
    pub importance: f64,
    /// Level on the 0-7 scale. `None` means "not measured", which is not the
    /// same thing as a measured zero.
    pub level: Option<f64>,
    pub kind: CompetencyKind,
}

/// A software or tool used in an occupation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologySkill {
    pub name: String,
    /// Whether the service flags this technology as in high demand.
    pub hot_technology: bool,
}

/// A work task statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub importance: f64,
}

/// Share of workers reporting a given education level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationLevel {
    pub name: String,
    pub percentage: f64,
}

/// Full competency data for one occupation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompetencyProfile {
    /// Versioned occupation code, e.g. `15-1252.00`.
    pub code: String,
    pub title: String,
    pub description: String,
    /// Preparation scale 1-5; 0 when unknown.
    pub job_zone: u8,
    pub bright_outlook: bool,
    pub skills: Vec<CompetencyItem>,
    pub knowledge: Vec<CompetencyItem>,
    pub abilities: Vec<CompetencyItem>,
    pub technology_skills: Vec<TechnologySkill>,
    pub tasks: Vec<Task>,
    /// Education distribution in the order the service returned it; empty
    /// when the education lookup failed or had no data.
    pub education: Vec<EducationLevel>,
}

impl CompetencyProfile {
    /// Iterate skills, knowledge and abilities in that order.
    pub fn competencies(&self) -> impl Iterator<Item = &CompetencyItem> {
        self.skills
            .iter()
            .chain(self.knowledge.iter())
            .chain(self.abilities.iter())
    }
}

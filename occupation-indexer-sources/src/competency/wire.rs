//! Response bodies of the competency web service.
//!
//! Every field is defaulted: the service omits empty sections instead of
//! returning empty arrays.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use occupation_indexer_shared::{
    CompetencyItem, CompetencyKind, EducationLevel, Task, TechnologySkill,
};

const IMPORTANCE_SCALE: &str = "IM";
const LEVEL_SCALE: &str = "LV";

/// Basic occupation info, `online/occupations/{code}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct OccupationInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Map<String, Value>,
}

impl OccupationInfo {
    /// Only a literal `true` tag counts.
    pub fn bright_outlook(&self) -> bool {
        matches!(self.tags.get("bright_outlook"), Some(Value::Bool(true)))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct JobZoneSummary {
    #[serde(default)]
    pub job_zone: Option<JobZoneValue>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct JobZoneValue {
    #[serde(default)]
    pub value: Option<u8>,
}

impl JobZoneSummary {
    pub fn zone(&self) -> u8 {
        self.job_zone.as_ref().and_then(|z| z.value).unwrap_or(0)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Scale {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Score {
    #[serde(default)]
    pub scale: Scale,
    #[serde(default)]
    pub value: f64,
}

fn scale_value(scores: &[Score], scale: &str) -> Option<f64> {
    scores
        .iter()
        .rev()
        .find(|s| s.scale.id == scale)
        .map(|s| s.value)
}

/// Skills, knowledge or abilities summary.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ElementList {
    #[serde(default)]
    pub element: Vec<Element>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Element {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub score: Vec<Score>,
}

impl ElementList {
    pub fn into_items(self, kind: CompetencyKind) -> Vec<CompetencyItem> {
        self.element
            .into_iter()
            .map(|e| CompetencyItem {
                importance: scale_value(&e.score, IMPORTANCE_SCALE).unwrap_or(0.0),
                level: scale_value(&e.score, LEVEL_SCALE),
                id: e.id,
                name: e.name,
                description: e.description,
                kind,
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TechnologySummary {
    #[serde(default)]
    pub category: Vec<TechnologyCategory>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TechnologyCategory {
    #[serde(default)]
    pub example: Vec<TechnologyExample>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TechnologyExample {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hot_technology: bool,
}

impl TechnologySummary {
    pub fn into_skills(self) -> Vec<TechnologySkill> {
        self.category
            .into_iter()
            .flat_map(|c| c.example)
            .map(|e| TechnologySkill {
                name: e.name,
                hot_technology: e.hot_technology,
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TaskSummary {
    #[serde(default)]
    pub task: Vec<TaskEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TaskEntry {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub statement: String,
    #[serde(default)]
    pub score: Vec<Score>,
}

impl TaskSummary {
    pub fn into_tasks(self) -> Vec<Task> {
        self.task
            .into_iter()
            .map(|t| Task {
                id: match &t.id {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                },
                importance: scale_value(&t.score, IMPORTANCE_SCALE).unwrap_or(0.0),
                description: t.statement,
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EducationSummary {
    #[serde(default)]
    pub level: Vec<EducationEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EducationEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub percentage: f64,
}

impl EducationSummary {
    pub fn into_levels(self) -> Vec<EducationLevel> {
        self.level
            .into_iter()
            .map(|l| EducationLevel {
                name: l.name,
                percentage: l.percentage,
            })
            .collect()
    }
}

/// One entry of the service's occupation catalogue.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OccupationSummary {
    /// Versioned occupation code.
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OccupationList {
    #[serde(default)]
    pub occupation: Vec<OccupationSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_scores() {
        let list: ElementList = serde_json::from_value(json!({
            "element": [
                {
                    "id": "2.A.1.a",
                    "name": "Reading Comprehension",
                    "description": "Understanding written sentences",
                    "score": [
                        { "scale": { "id": "IM" }, "value": 4.12 },
                        { "scale": { "id": "LV" }, "value": 4.88 }
                    ]
                },
                {
                    "id": "2.A.1.b",
                    "name": "Active Listening",
                    "score": [{ "scale": { "id": "LV" }, "value": 0.0 }]
                },
                { "id": "2.A.1.c", "name": "Writing" }
            ]
        }))
        .unwrap();

        let items = list.into_items(CompetencyKind::Skill);

        assert_eq!(items[0].importance, 4.12);
        assert_eq!(items[0].level, Some(4.88));
        assert_eq!(items[1].importance, 0.0);
        assert_eq!(items[1].level, Some(0.0));
        assert_eq!(items[2].level, None);
        assert_eq!(items[2].description, "");
        assert!(items.iter().all(|i| i.kind == CompetencyKind::Skill));
    }

    #[test]
    fn test_bright_outlook_requires_true() {
        let yes: OccupationInfo =
            serde_json::from_value(json!({ "tags": { "bright_outlook": true } })).unwrap();
        let no: OccupationInfo =
            serde_json::from_value(json!({ "tags": { "bright_outlook": false } })).unwrap();
        let odd: OccupationInfo =
            serde_json::from_value(json!({ "tags": { "bright_outlook": "yes" } })).unwrap();

        assert!(yes.bright_outlook());
        assert!(!no.bright_outlook());
        assert!(!odd.bright_outlook());
        assert!(!OccupationInfo::default().bright_outlook());
    }

    #[test]
    fn test_tasks_and_technology() {
        let tasks: TaskSummary = serde_json::from_value(json!({
            "task": [{
                "id": 16987,
                "statement": "Modify existing software.",
                "score": [{ "scale": { "id": "IM" }, "value": 4.5 }]
            }]
        }))
        .unwrap();
        let tasks = tasks.into_tasks();
        assert_eq!(tasks[0].id, "16987");
        assert_eq!(tasks[0].importance, 4.5);

        let tech: TechnologySummary = serde_json::from_value(json!({
            "category": [
                { "example": [{ "name": "Python", "hot_technology": true }, { "name": "Vim" }] },
                { "example": [{ "name": "Git", "hot_technology": true }] }
            ]
        }))
        .unwrap();
        let names: Vec<String> = tech.into_skills().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Python", "Vim", "Git"]);
    }
}

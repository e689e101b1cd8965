//! Cross-occupation aggregation of competency items.
//!
//! Every skill, knowledge area and ability seen in any profile becomes one
//! bucket keyed by its taxonomy id. The bucket collects the occupations that
//! report the item so the transformer can compute averages over them.

use std::collections::{BTreeMap, HashMap};

use occupation_indexer_shared::{
    CompetencyItem, CompetencyKind, CompetencyProfile, RelatedOccupation, SkillDocument,
};
use tracing::debug;

use crate::transformer::DocumentTransformer;

#[derive(Debug)]
struct SkillBucket {
    name: String,
    description: String,
    kind: CompetencyKind,
    occupations: Vec<RelatedOccupation>,
    /// Position of each occupation code in `occupations`.
    positions: HashMap<String, usize>,
}

impl SkillBucket {
    fn new(item: &CompetencyItem) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
            kind: item.kind,
            occupations: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn record(&mut self, item: &CompetencyItem, occupation_code: &str, title: &str) {
        self.name = item.name.clone();
        self.description = item.description.clone();
        self.kind = item.kind;

        let related = RelatedOccupation {
            occupation_code: occupation_code.to_string(),
            title: title.to_string(),
            importance: item.importance,
            level: item.level,
        };

        // A profile listing the same element twice keeps one entry.
        match self.positions.get(occupation_code) {
            Some(&index) => self.occupations[index] = related,
            None => {
                self.positions
                    .insert(occupation_code.to_string(), self.occupations.len());
                self.occupations.push(related);
            }
        }
    }
}

/// Accumulates competency items across profiles.
#[derive(Debug, Default)]
pub struct SkillAggregator {
    buckets: BTreeMap<String, SkillBucket>,
}

impl SkillAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct competency items seen so far.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Add every competency of a profile under its occupation code.
    ///
    /// # Arguments
    ///
    /// * `occupation_code` - Canonical occupation code the profile belongs to
    /// * `profile` - The fetched profile
    pub fn add_profile(&mut self, occupation_code: &str, profile: &CompetencyProfile) {
        for item in profile.competencies() {
            if item.id.is_empty() {
                debug!(occupation_code, name = %item.name, "Skipping competency without id");
                continue;
            }
            self.bucket_mut(item)
                .record(item, occupation_code, &profile.title);
        }
    }

    fn bucket_mut(&mut self, item: &CompetencyItem) -> &mut SkillBucket {
        self.buckets
            .entry(item.id.clone())
            .or_insert_with(|| SkillBucket::new(item))
    }

    /// Turn every bucket into a skill document, ordered by item id.
    pub fn build(self, transformer: &DocumentTransformer) -> Vec<SkillDocument> {
        self.buckets
            .into_iter()
            .map(|(skill_id, bucket)| {
                transformer.transform_skill_document(
                    &skill_id,
                    &bucket.name,
                    bucket.kind,
                    &bucket.description,
                    bucket.occupations,
                )
            })
            .collect()
    }
}

//! # Occupation Indexer Shared
//!
//! Plain data types shared by every crate of the occupation indexer: raw
//! rows of the wage dataset, competency profiles, the documents written to
//! the search index, and the occupation code normalizer.

pub mod documents;
pub mod profile;
pub mod soc;
pub mod tabular;

pub use documents::{
    CompetencyEntry, IndexDocument, LocationWageDocument, OccupationDocument, RelatedOccupation,
    SkillDocument, NOT_SPECIFIED,
};
pub use profile::{
    CompetencyItem, CompetencyKind, CompetencyProfile, EducationLevel, Task, TechnologySkill,
};
pub use soc::{
    from_versioned_code, normalize_soc_code, to_versioned_code, try_normalize_soc_code, CodeError,
};
pub use tabular::{Granularity, TabularOccupationRow, TabularValue};

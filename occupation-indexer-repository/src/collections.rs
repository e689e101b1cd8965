//! Collection schemas.
//!
//! Three logical collections back the occupation index. Each declares its
//! fields with a type, a facetable flag and an optional flag; backends
//! translate the declaration into their own mapping format.

/// Occupations collection, one document per SOC code.
pub const OCCUPATIONS: &str = "occupations";

/// Wages by state and metropolitan area.
pub const LOCATION_WAGES: &str = "occupation_wages_by_location";

/// Skills, knowledge and abilities aggregated across occupations.
pub const SKILLS: &str = "skills";

/// Field types understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    StringArray,
    Int32,
    Int64,
    Float,
    Bool,
    ObjectArray,
}

impl FieldType {
    /// Whether values of this type are text.
    pub fn is_text(&self) -> bool {
        matches!(self, FieldType::String | FieldType::StringArray)
    }
}

/// A single declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub field_type: FieldType,
    pub facet: bool,
    pub optional: bool,
}

impl FieldSchema {
    const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            facet: false,
            optional: false,
        }
    }

    const fn facet(mut self) -> Self {
        self.facet = true;
        self
    }

    const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Declared schema of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    pub name: &'static str,
    pub fields: Vec<FieldSchema>,
    pub default_sorting_field: &'static str,
}

impl CollectionSchema {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Schema of the occupations collection.
pub fn occupations_schema() -> CollectionSchema {
    use FieldType::*;

    CollectionSchema {
        name: OCCUPATIONS,
        fields: vec![
            FieldSchema::new("soc_code", String).facet(),
            FieldSchema::new("onet_code", String).facet(),
            FieldSchema::new("title", String),
            FieldSchema::new("description", String).optional(),
            FieldSchema::new("occupation_group", String).facet(),
            FieldSchema::new("national_employment", Int32).optional(),
            FieldSchema::new("national_mean_wage", Float).optional(),
            FieldSchema::new("national_median_wage", Float).optional(),
            FieldSchema::new("hourly_mean_wage", Float).optional(),
            FieldSchema::new("hourly_median_wage", Float).optional(),
            FieldSchema::new("wage_pct_10", Float).optional(),
            FieldSchema::new("wage_pct_25", Float).optional(),
            FieldSchema::new("wage_pct_75", Float).optional(),
            FieldSchema::new("wage_pct_90", Float).optional(),
            FieldSchema::new("hourly_pct_10", Float).optional(),
            FieldSchema::new("hourly_pct_25", Float).optional(),
            FieldSchema::new("hourly_pct_75", Float).optional(),
            FieldSchema::new("hourly_pct_90", Float).optional(),
            FieldSchema::new("job_zone", Int32).facet().optional(),
            FieldSchema::new("education_level", String).facet().optional(),
            FieldSchema::new("experience_required", String).facet().optional(),
            FieldSchema::new("bright_outlook", Bool).facet().optional(),
            FieldSchema::new("skills", ObjectArray).optional(),
            FieldSchema::new("knowledge_areas", ObjectArray).optional(),
            FieldSchema::new("abilities", ObjectArray).optional(),
            FieldSchema::new("technology_skills", StringArray).facet().optional(),
            FieldSchema::new("hot_technologies", StringArray).facet().optional(),
            FieldSchema::new("tasks", StringArray).optional(),
            FieldSchema::new("skill_names", StringArray).facet().optional(),
            FieldSchema::new("knowledge_names", StringArray).facet().optional(),
            FieldSchema::new("ability_names", StringArray).facet().optional(),
            FieldSchema::new("last_updated", Int64),
        ],
        default_sorting_field: "national_employment",
    }
}

/// Schema of the location wages collection.
pub fn location_wages_schema() -> CollectionSchema {
    use FieldType::*;

    CollectionSchema {
        name: LOCATION_WAGES,
        fields: vec![
            FieldSchema::new("soc_code", String).facet(),
            FieldSchema::new("occupation_title", String),
            FieldSchema::new("area_type", String).facet(),
            FieldSchema::new("area_code", String).facet(),
            FieldSchema::new("area_title", String),
            FieldSchema::new("state_code", String).facet().optional(),
            FieldSchema::new("state_name", String).optional(),
            FieldSchema::new("employment", Int32).optional(),
            FieldSchema::new("employment_per_1000", Float).optional(),
            FieldSchema::new("location_quotient", Float).optional(),
            FieldSchema::new("hourly_mean_wage", Float).optional(),
            FieldSchema::new("hourly_median_wage", Float).optional(),
            FieldSchema::new("hourly_pct_10", Float).optional(),
            FieldSchema::new("hourly_pct_25", Float).optional(),
            FieldSchema::new("hourly_pct_75", Float).optional(),
            FieldSchema::new("hourly_pct_90", Float).optional(),
            FieldSchema::new("annual_mean_wage", Float).optional(),
            FieldSchema::new("annual_median_wage", Float).optional(),
            FieldSchema::new("annual_pct_10", Float).optional(),
            FieldSchema::new("annual_pct_25", Float).optional(),
            FieldSchema::new("annual_pct_75", Float).optional(),
            FieldSchema::new("annual_pct_90", Float).optional(),
            FieldSchema::new("data_year", Int32).facet(),
            FieldSchema::new("last_updated", Int64),
        ],
        default_sorting_field: "employment",
    }
}

/// Schema of the skills collection.
pub fn skills_schema() -> CollectionSchema {
    use FieldType::*;

    CollectionSchema {
        name: SKILLS,
        fields: vec![
            FieldSchema::new("skill_id", String),
            FieldSchema::new("skill_name", String),
            FieldSchema::new("skill_type", String).facet(),
            FieldSchema::new("description", String),
            FieldSchema::new("category", String).facet(),
            FieldSchema::new("related_occupations", ObjectArray),
            FieldSchema::new("occupation_count", Int32),
            FieldSchema::new("avg_importance", Float),
            FieldSchema::new("avg_level", Float),
            FieldSchema::new("last_updated", Int64),
        ],
        default_sorting_field: "occupation_count",
    }
}

/// Every collection the pipeline provisions, in provisioning order.
pub fn all_schemas() -> Vec<CollectionSchema> {
    vec![occupations_schema(), location_wages_schema(), skills_schema()]
}

/// Find the declared schema of a collection by logical name.
pub fn schema_for(name: &str) -> Option<CollectionSchema> {
    all_schemas().into_iter().find(|s| s.name == name)
}

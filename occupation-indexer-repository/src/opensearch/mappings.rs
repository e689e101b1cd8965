//! OpenSearch index settings and mappings.
//!
//! Translates a declared [`CollectionSchema`] into the body of an index
//! creation request:
//! - Facetable text fields are `text` with a `keyword` sub-field used for
//!   filters, facets and sorting
//! - Other text fields are plain `text`
//! - Object arrays are stored but not indexed

use serde_json::{json, Map, Value};

use crate::collections::{CollectionSchema, FieldSchema, FieldType};
use crate::config::StoreConfig;

/// Name of the keyword sub-field added to facetable text fields.
pub const KEYWORD_SUBFIELD: &str = "keyword";

/// Build the index creation body for a collection.
pub fn index_body(schema: &CollectionSchema, config: &StoreConfig) -> Value {
    let mut properties = Map::new();
    for field in &schema.fields {
        properties.insert(field.name.to_string(), field_mapping(field));
    }

    json!({
        "settings": {
            "number_of_shards": config.number_of_shards,
            "number_of_replicas": config.number_of_replicas
        },
        "mappings": {
            "dynamic": false,
            "properties": properties
        }
    })
}

fn field_mapping(field: &FieldSchema) -> Value {
    match field.field_type {
        FieldType::String | FieldType::StringArray if field.facet => json!({
            "type": "text",
            "fields": {
                KEYWORD_SUBFIELD: { "type": "keyword" }
            }
        }),
        FieldType::String | FieldType::StringArray => json!({ "type": "text" }),
        FieldType::Int32 => json!({ "type": "integer" }),
        FieldType::Int64 => json!({ "type": "long" }),
        FieldType::Float => json!({ "type": "float" }),
        FieldType::Bool => json!({ "type": "boolean" }),
        FieldType::ObjectArray => json!({ "type": "object", "enabled": false }),
    }
}

/// Path to use when filtering, faceting or sorting on a field.
///
/// Facetable text fields resolve to their keyword sub-field; everything else
/// is addressed directly.
pub fn exact_field_path(schema: Option<&CollectionSchema>, field: &str) -> String {
    match schema.and_then(|s| s.field(field)) {
        Some(f) if f.field_type.is_text() && f.facet => format!("{}.{}", field, KEYWORD_SUBFIELD),
        _ => field.to_string(),
    }
}

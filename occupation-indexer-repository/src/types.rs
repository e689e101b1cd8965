//! Request and response types for document store operations.

use serde::Serialize;
use serde_json::Value;

use crate::errors::StoreError;
use occupation_indexer_shared::IndexDocument;

/// A document ready to be written: its id and its serialized body.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Primary key within the collection.
    pub id: String,
    /// Full document body. Upserting replaces any prior body wholesale.
    pub body: Value,
}

impl StoredDocument {
    /// Serialize an indexable record into a stored document.
    pub fn from_document<D: IndexDocument>(document: &D) -> Result<Self, StoreError> {
        Ok(Self {
            id: document.document_id().to_string(),
            body: serde_json::to_value(document)?,
        })
    }
}

/// Outcome of upserting a single document inside a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertItemResult {
    /// The document id the store reported on.
    pub id: String,
    /// Whether the store accepted the document.
    pub success: bool,
    /// Store-provided reason when the document was rejected.
    pub error: Option<String>,
}

impl UpsertItemResult {
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Value of an equality filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Bool(bool),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

/// `field := value` equality filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: FilterValue,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Query against one collection.
///
/// A query text of `*` (or an empty string) matches every document.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub query_by: Vec<String>,
    pub filters: Vec<FieldFilter>,
    pub sort_by: Option<(String, SortOrder)>,
    pub facet_by: Vec<String>,
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
}

impl SearchRequest {
    /// Create a request for the given query text.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            query_by: Vec::new(),
            filters: Vec::new(),
            sort_by: None,
            facet_by: Vec::new(),
            page: 1,
            per_page: 10,
        }
    }

    /// Request matching every document.
    pub fn match_all() -> Self {
        Self::new("*")
    }

    pub fn query_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_by = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some((field.into(), order));
        self
    }

    pub fn facet_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facet_by = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn page(mut self, page: usize, per_page: usize) -> Self {
        self.page = page.max(1);
        self.per_page = per_page;
        self
    }

    /// Whether the query text matches everything.
    pub fn is_wildcard(&self) -> bool {
        let trimmed = self.query.trim();
        trimmed.is_empty() || trimmed == "*"
    }

    /// Offset of the first hit of the requested page.
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1) * self.per_page
    }
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub score: Option<f64>,
    pub document: Value,
}

/// Counts per distinct value of one facet field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetCounts {
    pub field: String,
    pub counts: Vec<(String, u64)>,
}

/// Search results.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SearchResponse {
    /// Total number of matching documents, across all pages.
    pub found: u64,
    pub page: usize,
    pub hits: Vec<SearchHit>,
    pub facet_counts: Vec<FacetCounts>,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Document count and field count of one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionStats {
    pub name: String,
    pub num_documents: u64,
    pub num_fields: usize,
}

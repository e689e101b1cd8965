//! OpenSearch query builders and response parsing.
//!
//! This module turns a backend-neutral [`SearchRequest`] into an OpenSearch
//! `_search` body and parses the response back into a [`SearchResponse`].

use serde_json::{json, Map, Value};

use crate::collections::CollectionSchema;
use crate::errors::StoreError;
use crate::opensearch::mappings::exact_field_path;
use crate::types::{FacetCounts, SearchHit, SearchRequest, SearchResponse};

/// Buckets returned per facet.
const FACET_SIZE: usize = 100;

/// Build an OpenSearch search body from a SearchRequest.
///
/// The builder handles:
/// - Wildcard queries (`*` or empty) as `match_all`
/// - `multi_match` over the requested `query_by` fields
/// - Equality filters as `term` clauses in filter context
/// - Sorting and faceting on the exact (keyword) form of text fields
/// - 1-based paging via `from` / `size`
pub fn build_search_body(schema: Option<&CollectionSchema>, request: &SearchRequest) -> Value {
    let text_query = build_text_query(request);

    let filters: Vec<Value> = request
        .filters
        .iter()
        .map(|f| {
            json!({
                "term": { exact_field_path(schema, &f.field): f.value }
            })
        })
        .collect();

    let query = if filters.is_empty() {
        text_query
    } else {
        json!({
            "bool": {
                "must": [text_query],
                "filter": filters
            }
        })
    };

    let mut body = Map::new();
    body.insert("query".to_string(), query);
    body.insert("from".to_string(), json!(request.offset()));
    body.insert("size".to_string(), json!(request.per_page));
    body.insert("track_total_hits".to_string(), json!(true));

    if let Some((field, order)) = &request.sort_by {
        body.insert(
            "sort".to_string(),
            json!([{ exact_field_path(schema, field): { "order": order.as_str() } }]),
        );
    }

    if !request.facet_by.is_empty() {
        let mut aggs = Map::new();
        for field in &request.facet_by {
            aggs.insert(
                field.clone(),
                json!({
                    "terms": {
                        "field": exact_field_path(schema, field),
                        "size": FACET_SIZE
                    }
                }),
            );
        }
        body.insert("aggs".to_string(), Value::Object(aggs));
    }

    Value::Object(body)
}

fn build_text_query(request: &SearchRequest) -> Value {
    if request.is_wildcard() {
        return json!({ "match_all": {} });
    }

    if request.query_by.is_empty() {
        json!({
            "query_string": { "query": request.query }
        })
    } else {
        json!({
            "multi_match": {
                "query": request.query,
                "fields": request.query_by
            }
        })
    }
}

/// Parse an OpenSearch `_search` response body.
pub fn parse_search_response(body: &Value, page: usize) -> Result<SearchResponse, StoreError> {
    let hits_obj = body
        .get("hits")
        .ok_or_else(|| StoreError::parse("search response has no hits"))?;

    let found = hits_obj["total"]["value"]
        .as_u64()
        .or_else(|| hits_obj["total"].as_u64())
        .unwrap_or(0);

    let hits = hits_obj["hits"]
        .as_array()
        .map(|arr| arr.iter().filter_map(parse_hit).collect())
        .unwrap_or_default();

    let facet_counts = body["aggregations"]
        .as_object()
        .map(|aggs| {
            aggs.iter()
                .map(|(field, agg)| FacetCounts {
                    field: field.clone(),
                    counts: agg["buckets"]
                        .as_array()
                        .map(|buckets| buckets.iter().filter_map(parse_bucket).collect())
                        .unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(SearchResponse {
        found,
        page,
        hits,
        facet_counts,
    })
}

/// Parse a single hit, skipping hits without an id or source.
fn parse_hit(hit: &Value) -> Option<SearchHit> {
    Some(SearchHit {
        id: hit["_id"].as_str()?.to_string(),
        score: hit["_score"].as_f64(),
        document: hit.get("_source")?.clone(),
    })
}

fn parse_bucket(bucket: &Value) -> Option<(String, u64)> {
    let key = match &bucket["key"] {
        Value::String(s) => s.clone(),
        Value::Null => return None,
        other => bucket["key_as_string"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    };
    Some((key, bucket["doc_count"].as_u64()?))
}

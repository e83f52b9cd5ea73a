//! Facet aggregations.
//!
//! The top-level filter only narrows the returned hits, so every facet applies the filters
//! it should respect itself. Which ones depends on its scope:
//!
//! - `exclude_field_filter`: every filter except the one on the facet's own field, so the
//!   counts show what the facet would look like with its own selection lifted.
//! - `all_filters`: every filter, so the counts describe the current result set.
//!
//! Both scopes render identically when nothing filters the facet's field.

use serde_json::{Map, Value, json};

use crate::{FacetScope, SearchParameters, components::FilterSet};

/// Name of the nested bucket aggregation inside a filtered facet.
pub const FILTERED_AGGREGATION: &str = "filtered_aggregations";

/// Suffix of the companion aggregation counting documents that lack the field.
pub const MISSING_SUFFIX: &str = "_with_missing_value";

/// Builds one term aggregation (plus its missing-value companion) per requested facet.
pub struct Aggregates<'a> {
    /// The request.
    params: &'a SearchParameters,
    /// Rendered filters of the request.
    filters: &'a FilterSet,
    /// Bucket ceiling.
    size_ceiling: usize,
}

impl<'a> Aggregates<'a> {
    /// Creates the builder.
    pub fn new(params: &'a SearchParameters, filters: &'a FilterSet, size_ceiling: usize) -> Self {
        Self {
            params,
            filters,
            size_ceiling,
        }
    }

    /// Aggregations keyed by name; empty when no facets were requested.
    pub fn payload(&self) -> Map<String, Value> {
        let mut aggs = Map::new();
        for (field, facet) in &self.params.facets {
            let scope_filter = self.scope_filter(field, facet.scope);
            let terms = json!({
                "terms": {
                    "field": field,
                    "order": { "_count": "desc" },
                    "size": self.size_ceiling,
                }
            });
            let missing = json!({ "missing": { "field": field } });

            aggs.insert(field.clone(), scoped(terms, scope_filter.as_ref()));
            aggs.insert(
                format!("{field}{MISSING_SUFFIX}"),
                scoped(missing, scope_filter.as_ref()),
            );
        }
        aggs
    }

    /// Filter a facet on `field` must apply under `scope`.
    fn scope_filter(&self, field: &str, scope: FacetScope) -> Option<Value> {
        match scope {
            FacetScope::AllFilters => self.filters.payload(),
            FacetScope::ExcludeFieldFilter => self.filters.excluding_field(field),
        }
    }
}

/// Nests `aggregation` under a filter aggregation when a filter applies.
fn scoped(aggregation: Value, filter: Option<&Value>) -> Value {
    match filter {
        None => aggregation,
        Some(filter) => json!({
            "filter": filter,
            "aggs": { FILTERED_AGGREGATION: aggregation },
        }),
    }
}

//! Deployment-level settings shared by every request.

use std::collections::BTreeMap;

use crate::FieldFilter;

/// Default upper bound on the number of buckets a facet aggregation returns.
pub const DEFAULT_FACET_SIZE_CEILING: usize = 100_000;

/// Default name of the document popularity field.
pub const DEFAULT_POPULARITY_FIELD: &str = "popularity";

/// Default upper bound on curated entries fetched per query.
pub const DEFAULT_MAX_CURATED_CANDIDATES: usize = 1000;

/// Settings that do not vary per request.
///
/// Built once at startup from configuration and borrowed by every query builder.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySettings {
    /// Relevance multiplier per document format.
    pub format_weights: BTreeMap<String, f64>,
    /// Filters applied to every request.
    pub base_filters: Vec<FieldFilter>,
    /// Bucket ceiling for facet aggregations.
    pub facet_size_ceiling: usize,
    /// Name of the popularity field blended into relevance.
    pub popularity_field: String,
    /// Upper bound on curated entries fetched per query.
    pub max_curated_candidates: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            format_weights: default_format_weights(),
            base_filters: Vec::new(),
            facet_size_ceiling: DEFAULT_FACET_SIZE_CEILING,
            popularity_field: DEFAULT_POPULARITY_FIELD.to_string(),
            max_curated_candidates: DEFAULT_MAX_CURATED_CANDIDATES,
        }
    }
}

/// The built-in format weight table.
pub fn default_format_weights() -> BTreeMap<String, f64> {
    [
        ("smart-answer", 1.5),
        ("transaction", 1.5),
        ("topical_event", 1.5),
        ("minister", 1.7),
        ("organisation", 2.5),
        ("topic", 1.5),
        ("document_series", 1.3),
        ("document_collection", 1.3),
        ("operational_field", 1.5),
        ("contact", 0.3),
        ("service_manual_guide", 0.3),
        ("service_manual_topic", 0.3),
    ]
    .into_iter()
    .map(|(format, weight)| (format.to_string(), weight))
    .collect()
}

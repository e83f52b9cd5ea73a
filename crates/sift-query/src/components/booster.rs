//! Per-format relevance multipliers.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::pipeline::QueryStage;

/// Document field holding the format name.
pub const FORMAT_FIELD: &str = "format";

/// Multiplies relevance by a static per-format weight.
///
/// A document has one format, so at most one function matches it; formats absent from the
/// table keep their score.
pub struct FormatBoost<'a> {
    /// Format name to multiplier.
    weights: &'a BTreeMap<String, f64>,
}

impl<'a> FormatBoost<'a> {
    /// Creates a booster over the given weight table.
    pub fn new(weights: &'a BTreeMap<String, f64>) -> Self {
        Self { weights }
    }

    /// One scoring function per weighted format.
    fn functions(&self) -> Vec<Value> {
        self.weights
            .iter()
            .map(|(format, weight)| {
                json!({
                    "filter": { "term": { FORMAT_FIELD: format } },
                    "boost_factor": weight,
                })
            })
            .collect()
    }
}

impl QueryStage for FormatBoost<'_> {
    fn name(&self) -> &'static str {
        "format_boost"
    }

    fn wrap(&self, inner: Value) -> Value {
        if self.weights.is_empty() {
            return inner;
        }
        json!({
            "function_score": {
                "query": inner,
                "functions": self.functions(),
                "score_mode": "multiply",
                "boost_mode": "multiply",
            }
        })
    }
}

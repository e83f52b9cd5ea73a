//! Popularity blending.

use serde_json::{Value, json};

use crate::pipeline::QueryStage;

/// Scales relevance by a logarithm of the document's popularity.
///
/// `log2p` is `log10(2 + popularity)`: monotonic, never zero for unpopular documents, and
/// grows slowly enough that popularity cannot swamp textual relevance.
pub struct PopularityBoost<'a> {
    /// Popularity field name.
    field: &'a str,
    /// Whether the boost is switched off for this request.
    disabled: bool,
}

impl<'a> PopularityBoost<'a> {
    /// Creates the stage; `disabled` turns it into a passthrough.
    pub fn new(field: &'a str, disabled: bool) -> Self {
        Self { field, disabled }
    }
}

impl QueryStage for PopularityBoost<'_> {
    fn name(&self) -> &'static str {
        "popularity"
    }

    fn wrap(&self, inner: Value) -> Value {
        if self.disabled {
            return inner;
        }
        json!({
            "function_score": {
                "query": inner,
                "field_value_factor": {
                    "field": self.field,
                    "modifier": "log2p",
                    "factor": 1.0,
                    "missing": 0,
                },
                "boost_mode": "multiply",
            }
        })
    }
}

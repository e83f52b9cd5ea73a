//! Explicit result ordering.

use serde_json::{Value, json};

use crate::SortOrder;

/// Sort clauses for an optional ordering; empty when ranking by relevance.
///
/// Documents without the sort field always come last, whichever the direction.
pub fn sort_clauses(order: Option<&SortOrder>) -> Vec<Value> {
    order
        .map(|order| {
            json!({
                order.field.as_str(): {
                    "order": order.direction.as_str(),
                    "missing": "_last",
                }
            })
        })
        .into_iter()
        .collect()
}

//! Test doubles shared across sift-query unit tests.
//!
//! Kept behind `cfg(test)` to avoid leaking into the public API surface.

use std::cell::Cell;

use serde_json::{Value, json};

use crate::{BestBetsError, CuratedIndex};

/// In-memory curated index returning canned hits.
#[derive(Default)]
pub struct StubCuratedIndex {
    /// Hits returned for every lookup.
    hits: Vec<Value>,
    /// Normalized form returned by `analyze`.
    analyzed: String,
    /// Error returned by every call, if set.
    failure: Option<BestBetsError>,
    /// Number of `analyze` calls made.
    analyze_calls: Cell<usize>,
    /// Number of `raw_search` calls made.
    search_calls: Cell<usize>,
}

impl StubCuratedIndex {
    /// Creates an index returning `hits`.
    pub fn with_hits(hits: Vec<Value>) -> Self {
        Self {
            hits,
            analyzed: "cheese".to_string(),
            ..Self::default()
        }
    }

    /// Creates an index whose every call fails with `error`.
    pub fn failing(error: BestBetsError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Sets the normalized form returned by `analyze`.
    pub fn analyzed_as(mut self, analyzed: &str) -> Self {
        self.analyzed = analyzed.to_string();
        self
    }

    /// Returns how many times `analyze` ran.
    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.get()
    }

    /// Returns how many times `raw_search` ran.
    pub fn search_calls(&self) -> usize {
        self.search_calls.get()
    }
}

impl CuratedIndex for StubCuratedIndex {
    fn analyze(&self, _text: &str) -> Result<String, BestBetsError> {
        self.analyze_calls.set(self.analyze_calls.get() + 1);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(self.analyzed.clone()),
        }
    }

    fn raw_search(&self, _payload: &Value) -> Result<Vec<Value>, BestBetsError> {
        self.search_calls.set(self.search_calls.get() + 1);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(self.hits.clone()),
        }
    }
}

/// Builds a curated index hit in the stored wire form.
pub fn curated_hit(query: &str, match_type: &str, best: &[(&str, u32)], worst: &[&str]) -> Value {
    json!({
        "_index": "metasearch",
        "_type": "best_bet",
        "_id": format!("{query}-{match_type}"),
        "_score": 1.0,
        "fields": { "details": details(best, worst) },
    })
}

/// Builds a stemmed curated hit carrying a normalized key.
pub fn stemmed_hit(query: &str, key: &str, best: &[(&str, u32)]) -> Value {
    let mut hit = curated_hit(query, "stemmed", best, &[]);
    hit["fields"]["stemmed_query_as_term"] = json!(key);
    hit
}

/// Serializes the editorial details JSON string.
fn details(best: &[(&str, u32)], worst: &[&str]) -> String {
    json!({
        "best_bets": best
            .iter()
            .map(|(link, position)| json!({ "link": link, "position": position }))
            .collect::<Vec<_>>(),
        "worst_bets": worst
            .iter()
            .map(|link| json!({ "link": link }))
            .collect::<Vec<_>>(),
    })
    .to_string()
}

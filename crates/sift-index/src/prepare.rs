//! Ingestion-time preparation of curated entries.

use serde_json::Value;
use sift_query::{BestBetsError, CuratedIndex, STEMMED_KEY_FIELD, pad};
use tracing::debug;

/// Document type of curated entries.
const BEST_BET_TYPE: &str = "best_bet";

/// Field holding the editor's query for stemmed matching.
const STEMMED_QUERY_FIELD: &str = "stemmed_query";

/// Precomputes the normalized match key of curated entries before they are stored.
pub struct CuratedEntryPreparer<'a> {
    /// Provides the analysis call.
    index: &'a dyn CuratedIndex,
}

impl<'a> CuratedEntryPreparer<'a> {
    /// Creates a preparer normalizing through `index`.
    pub fn new(index: &'a dyn CuratedIndex) -> Self {
        Self { index }
    }

    /// Fills `stemmed_query_as_term` on a `best_bet` document that has a `stemmed_query`.
    ///
    /// Any other document is returned unchanged.
    pub fn prepare(&self, mut doc: Value) -> Result<Value, BestBetsError> {
        if doc.get("_type").and_then(Value::as_str) != Some(BEST_BET_TYPE) {
            return Ok(doc);
        }
        let Some(query) = doc.get(STEMMED_QUERY_FIELD).and_then(Value::as_str) else {
            return Ok(doc);
        };

        let key = pad(&self.index.analyze(query)?);
        debug!(%key, "prepared curated entry");
        if let Value::Object(fields) = &mut doc {
            fields.insert(STEMMED_KEY_FIELD.to_string(), Value::String(key));
        }
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// Normalizer that lower-cases and drops a trailing "s".
    struct Stemmer;

    impl CuratedIndex for Stemmer {
        fn analyze(&self, text: &str) -> Result<String, BestBetsError> {
            Ok(text
                .split_whitespace()
                .map(|w| w.to_lowercase().trim_end_matches('s').to_string())
                .collect::<Vec<_>>()
                .join(" "))
        }

        fn raw_search(&self, _payload: &Value) -> Result<Vec<Value>, BestBetsError> {
            Ok(Vec::new())
        }
    }

    /// Normalizer whose engine is down.
    struct Down;

    impl CuratedIndex for Down {
        fn analyze(&self, _text: &str) -> Result<String, BestBetsError> {
            Err(BestBetsError::Unavailable("connection refused".into()))
        }

        fn raw_search(&self, _payload: &Value) -> Result<Vec<Value>, BestBetsError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_best_bet_gets_padded_key() {
        let doc = json!({
            "_type": "best_bet",
            "stemmed_query": "Car Tax Discs",
            "details": "{}"
        });

        let prepared = CuratedEntryPreparer::new(&Stemmer).prepare(doc).unwrap();

        assert_eq!(prepared[STEMMED_KEY_FIELD], " car tax disc ");
        assert_eq!(prepared["stemmed_query"], "Car Tax Discs");
    }

    #[test]
    fn test_other_documents_pass_through() {
        let doc = json!({ "_type": "edition", "stemmed_query": "cheese" });
        let prepared = CuratedEntryPreparer::new(&Stemmer)
            .prepare(doc.clone())
            .unwrap();
        assert_eq!(prepared, doc);
    }

    #[test]
    fn test_exact_best_bet_passes_through() {
        let doc = json!({ "_type": "best_bet", "exact_query": "cheese" });
        let prepared = CuratedEntryPreparer::new(&Down).prepare(doc.clone()).unwrap();
        assert_eq!(prepared, doc);
    }

    #[test]
    fn test_analysis_failure_is_returned() {
        let doc = json!({ "_type": "best_bet", "stemmed_query": "cheese" });
        assert!(CuratedEntryPreparer::new(&Down).prepare(doc).is_err());
    }
}

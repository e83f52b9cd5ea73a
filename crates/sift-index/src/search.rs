//! Executes a query envelope against a resolved target.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sift_query::QueryEnvelope;
use tracing::info;

use crate::{client::EngineClient, error::IndexError, registry::MultiIndexTarget};

/// One ranked hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Index the document lives in.
    #[serde(rename = "_index")]
    pub index: String,
    /// Document identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Relevance score, absent when sorting by a field.
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    /// Returned fields.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Decoded engine answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    /// Engine-side time in milliseconds.
    pub took: u64,
    /// Number of matching documents.
    pub total: u64,
    /// Hits in rank order.
    pub hits: Vec<SearchHit>,
    /// Aggregation results keyed by aggregation name.
    pub aggregations: Map<String, Value>,
}

/// Wire shape of a search answer.
#[derive(Debug, Deserialize)]
struct RawResponse {
    /// Engine-side time.
    #[serde(default)]
    took: u64,
    /// Hit section.
    hits: RawHits,
    /// Aggregation section.
    #[serde(default)]
    aggregations: Map<String, Value>,
}

/// Wire shape of the hit section.
#[derive(Debug, Deserialize)]
struct RawHits {
    /// Either a plain count or `{"value": n}`.
    total: RawTotal,
    /// Ranked hits.
    #[serde(default)]
    hits: Vec<SearchHit>,
}

/// Total hit count in either engine dialect.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTotal {
    /// Older engines.
    Count(u64),
    /// Newer engines.
    Object {
        /// The count.
        value: u64,
    },
}

impl From<RawResponse> for SearchResponse {
    fn from(raw: RawResponse) -> Self {
        let total = match raw.hits.total {
            RawTotal::Count(n) | RawTotal::Object { value: n } => n,
        };
        Self {
            took: raw.took,
            total,
            hits: raw.hits.hits,
            aggregations: raw.aggregations,
        }
    }
}

/// Runs searches over the engine.
#[derive(Debug, Clone)]
pub struct Searcher {
    /// Engine transport.
    client: EngineClient,
}

impl Searcher {
    /// Creates a searcher over `client`.
    pub fn new(client: EngineClient) -> Self {
        Self { client }
    }

    /// Sends `envelope` to every index of `target` as one request.
    pub fn search(
        &self,
        target: &MultiIndexTarget,
        envelope: &QueryEnvelope,
    ) -> Result<SearchResponse, IndexError> {
        let segment = target.path_segment();
        let value = self
            .client
            .post_json(&format!("{segment}/_search"), envelope)?;
        let raw: RawResponse =
            serde_json::from_value(value).map_err(|e| IndexError::Decode(e.to_string()))?;
        let response = SearchResponse::from(raw);
        info!(
            target_indices = %segment,
            took = response.took,
            total = response.total,
            "search executed"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, time::Duration};

    use mockito::Matcher;
    use serde_json::json;
    use sift_query::{QueryBuilder, QuerySettings, SearchParameters};

    use super::*;
    use crate::registry::Registry;

    /// Curated index with nothing in it.
    struct NoBestBets;

    impl sift_query::CuratedIndex for NoBestBets {
        fn analyze(&self, text: &str) -> Result<String, sift_query::BestBetsError> {
            Ok(text.to_string())
        }

        fn raw_search(&self, _payload: &Value) -> Result<Vec<Value>, sift_query::BestBetsError> {
            Ok(Vec::new())
        }
    }

    fn target(names: &[&str]) -> MultiIndexTarget {
        let backends: BTreeMap<String, Vec<String>> = names
            .iter()
            .map(|n| ((*n).to_string(), vec![(*n).to_string()]))
            .collect();
        Registry::new(&backends).resolve_multi(names).unwrap()
    }

    fn envelope() -> QueryEnvelope {
        let params = SearchParameters::default();
        let settings = QuerySettings::default();
        let indices = vec!["mainstream".to_string()];
        QueryBuilder::new(&params, &settings, &indices, &NoBestBets)
            .payload()
            .unwrap()
    }

    fn searcher(server: &mockito::ServerGuard) -> Searcher {
        Searcher::new(EngineClient::new(&server.url(), Duration::from_secs(2)).unwrap())
    }

    #[test]
    fn test_search_posts_to_joined_indices() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/mainstream,government/_search")
            .match_body(Matcher::PartialJson(json!({ "query": { "match_all": {} } })))
            .with_status(200)
            .with_body(
                r#"{
                    "took": 7,
                    "hits": {
                        "total": 2,
                        "hits": [
                            {"_index": "mainstream", "_id": "/vat", "_score": 2.5,
                             "fields": {"title": "VAT"}},
                            {"_index": "government", "_id": "/tax", "_score": 1.0}
                        ]
                    },
                    "aggregations": {"format": {"buckets": []}}
                }"#,
            )
            .create();

        let response = searcher(&server)
            .search(&target(&["mainstream", "government"]), &envelope())
            .unwrap();

        mock.assert();
        assert_eq!(response.took, 7);
        assert_eq!(response.total, 2);
        assert_eq!(response.hits[0].id, "/vat");
        assert_eq!(response.hits[0].fields["title"], "VAT");
        assert_eq!(response.hits[1].score, Some(1.0));
        assert!(response.hits[1].fields.is_empty());
        assert!(response.aggregations.contains_key("format"));
    }

    #[test]
    fn test_total_as_object() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/mainstream/_search")
            .with_status(200)
            .with_body(
                r#"{"took": 1, "hits": {"total": {"value": 42, "relation": "eq"}, "hits": []}}"#,
            )
            .create();

        let response = searcher(&server)
            .search(&target(&["mainstream"]), &envelope())
            .unwrap();
        assert_eq!(response.total, 42);
        assert!(response.hits.is_empty());
    }

    #[test]
    fn test_missing_hits_section_is_a_decode_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/mainstream/_search")
            .with_status(200)
            .with_body(r#"{"took": 1}"#)
            .create();

        let err = searcher(&server)
            .search(&target(&["mainstream"]), &envelope())
            .unwrap_err();
        assert!(matches!(err, IndexError::Decode(_)));
    }
}

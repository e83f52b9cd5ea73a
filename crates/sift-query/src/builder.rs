//! The query builder: assembles every component into one envelope.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    CuratedIndex, CuratedOverrides, QueryError, QuerySettings, SearchParameters,
    components::{
        Aggregates, BestBetsWrap, CoreQuery, FilterSet, FormatBoost, PopularityBoost, highlight,
        match_all, more_like_this, sort_clauses,
    },
    curated::BestBetsResolver,
    pipeline::RankingPipeline,
};

/// Fields every result needs to expand its virtual fields, returned even when not requested.
pub const DEPENDENCY_FIELDS: &[&str] = &[
    "title",
    "description",
    "organisation_content_ids",
    "topic_content_ids",
    "mainstream_browse_page_content_ids",
];

/// A complete search request in the engine's wire format.
///
/// Empty parts are left out of the serialized form rather than sent as empty values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryEnvelope {
    /// Offset of the first result.
    pub from: usize,
    /// Page size.
    pub size: usize,
    /// Stored fields to return.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    /// The ranked query tree.
    pub query: Value,
    /// Filter narrowing the hits (not the facet counts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    /// Explicit ordering.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<Value>,
    /// Facet aggregations keyed by name.
    #[serde(rename = "aggs", skip_serializing_if = "Map::is_empty")]
    pub aggregates: Map<String, Value>,
    /// Snippet configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Value>,
    /// Ask the engine to explain scoring.
    #[serde(skip_serializing_if = "is_false")]
    pub explain: bool,
}

impl QueryEnvelope {
    /// Serializes the envelope into a JSON value.
    pub fn to_value(&self) -> Value {
        // Serializing plain maps, vectors and values cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Builds the query envelope for one request.
///
/// Everything the builder needs is passed in explicitly and only borrowed; the builder
/// itself holds no state between calls.
pub struct QueryBuilder<'a> {
    /// The request.
    params: &'a SearchParameters,
    /// Deployment settings.
    settings: &'a QuerySettings,
    /// Names of the indices holding searchable content.
    content_index_names: &'a [String],
    /// Curated overrides lookup.
    curated: &'a dyn CuratedIndex,
}

impl<'a> QueryBuilder<'a> {
    /// Creates a builder for one request.
    pub fn new(
        params: &'a SearchParameters,
        settings: &'a QuerySettings,
        content_index_names: &'a [String],
        curated: &'a dyn CuratedIndex,
    ) -> Self {
        Self {
            params,
            settings,
            content_index_names,
            curated,
        }
    }

    /// Assembles the full envelope.
    pub fn payload(&self) -> Result<QueryEnvelope, QueryError> {
        let filters = FilterSet::new(self.params, self.settings);
        let aggregates =
            Aggregates::new(self.params, &filters, self.settings.facet_size_ceiling).payload();

        Ok(QueryEnvelope {
            from: self.params.start,
            size: self.params.count,
            fields: self.fields(),
            query: self.query()?,
            filter: filters.payload(),
            sort: sort_clauses(self.params.order.as_ref()),
            aggregates,
            highlight: highlight(self.params),
            explain: self.params.debug.explain,
        })
    }

    /// The ranked query tree.
    ///
    /// Similarity and match-all queries are returned as they are; free-text queries go
    /// through the ranking pipeline.
    pub fn query(&self) -> Result<Value, QueryError> {
        if let Some(id) = &self.params.similar_to {
            debug!(similar_to = %id, "building similarity query");
            return Ok(more_like_this(id, self.content_index_names));
        }
        let Some(term) = self.params.search_term() else {
            debug!("no query text, matching everything");
            return Ok(match_all());
        };

        let core = CoreQuery::new(term, self.params).payload(self.params);
        let pipeline = RankingPipeline::new(
            FormatBoost::new(&self.settings.format_weights),
            PopularityBoost::new(
                &self.settings.popularity_field,
                self.params.debug.disable_popularity,
            ),
            BestBetsWrap::new(self.curated_overrides(term)?),
        );
        Ok(pipeline.run(core))
    }

    /// Requested fields followed by the dependency fields, without duplicates.
    pub fn fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        let requested = self.params.return_fields.iter().map(String::as_str);
        for field in requested.chain(DEPENDENCY_FIELDS.iter().copied()) {
            if !fields.iter().any(|f| f == field) {
                fields.push(field.to_string());
            }
        }
        fields
    }

    /// Overrides for `term`, degrading to none when the lookup is unavailable.
    fn curated_overrides(&self, term: &str) -> Result<CuratedOverrides, QueryError> {
        if self.params.debug.disable_best_bets {
            return Ok(CuratedOverrides::default());
        }
        let resolver = BestBetsResolver::new(self.curated, self.settings.max_curated_candidates);
        match resolver.resolve(term) {
            Ok(overrides) => Ok(overrides),
            Err(e) if e.is_degradable() => {
                warn!(error = %e, "best bets unavailable, continuing without curated results");
                Ok(CuratedOverrides::default())
            }
            Err(e) => Err(QueryError::BestBets(e)),
        }
    }
}

/// Serde helper for skipping false flags.
fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        BestBetsError, DebugFlags, FacetRequest, FacetScope, FieldFilter, SortDirection,
        SortOrder,
        components::PROMOTION_BOOST_STEP,
        test_support::{StubCuratedIndex, curated_hit},
    };

    fn content_indices() -> Vec<String> {
        vec!["mainstream".to_string(), "government".to_string()]
    }

    fn build(params: &SearchParameters, index: &StubCuratedIndex) -> QueryEnvelope {
        let settings = QuerySettings::default();
        let indices = content_indices();
        QueryBuilder::new(params, &settings, &indices, index)
            .payload()
            .unwrap()
    }

    fn cheese() -> SearchParameters {
        SearchParameters::for_query("cheese").with_page(0, 20)
    }

    fn no_best_bets() -> StubCuratedIndex {
        StubCuratedIndex::with_hits(vec![])
    }

    fn organic_query() -> Value {
        build(&cheese(), &no_best_bets()).query
    }

    #[test]
    fn test_unfiltered_search_omits_empty_keys() {
        let envelope = build(&cheese(), &no_best_bets());
        assert_eq!(envelope.from, 0);
        assert_eq!(envelope.size, 20);

        let value = envelope.to_value();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for absent in ["filter", "sort", "aggs", "highlight", "explain"] {
            assert!(!keys.contains(&absent), "{absent} should be omitted");
        }
        assert_eq!(value["from"], 0);
    }

    #[test]
    fn test_filters_reach_envelope() {
        let params = cheese().with_filters(vec![
            FieldFilter::text("organisations", vec!["hm-magic".into(), "hmrc".into()]),
            FieldFilter::text("section", vec!["levitation".into()]),
        ]);
        let envelope = build(&params, &no_best_bets());
        assert_eq!(
            envelope.filter,
            Some(json!({
                "and": [
                    { "terms": { "organisations": ["hm-magic", "hmrc"] } },
                    { "terms": { "section": ["levitation"] } },
                ]
            }))
        );
        assert!(envelope.aggregates.is_empty());
    }

    #[test]
    fn test_sort_reaches_envelope() {
        let params = cheese().with_order(SortOrder::new("public_timestamp", SortDirection::Desc));
        let envelope = build(&params, &no_best_bets());
        assert_eq!(
            envelope.sort,
            vec![json!({ "public_timestamp": { "order": "desc", "missing": "_last" } })]
        );
    }

    #[test]
    fn test_facets_serialize_as_aggs() {
        let params = cheese().with_facet(
            "organisations",
            FacetRequest::new(10, FacetScope::ExcludeFieldFilter),
        );
        let value = build(&params, &no_best_bets()).to_value();
        assert!(value["aggs"].get("organisations").is_some());
        assert!(value["aggs"].get("organisations_with_missing_value").is_some());
    }

    #[test]
    fn test_fields_include_dependencies_once() {
        let params = cheese().with_return_fields(vec!["link".into(), "title".into()]);
        let settings = QuerySettings::default();
        let indices = content_indices();
        let index = no_best_bets();
        let fields = QueryBuilder::new(&params, &settings, &indices, &index).fields();
        assert_eq!(
            fields,
            vec![
                "link",
                "title",
                "description",
                "organisation_content_ids",
                "topic_content_ids",
                "mainstream_browse_page_content_ids",
            ]
        );
    }

    #[test]
    fn test_ranking_stages_nest_in_order() {
        let query = organic_query();
        let popularity = &query["function_score"];
        assert!(popularity.get("field_value_factor").is_some());
        let format = &popularity["query"]["function_score"];
        assert!(format.get("functions").is_some());
        assert!(format["query"].get("bool").is_some());
    }

    #[test]
    fn test_best_bets_wrap_outermost() {
        let index = StubCuratedIndex::with_hits(vec![curated_hit(
            "cheese",
            "exact",
            &[("/foo", 1), ("/bar", 2)],
            &[],
        )]);
        let query = build(&cheese(), &index).query;
        assert_eq!(
            query,
            json!({
                "bool": {
                    "should": [
                        organic_query(),
                        {
                            "function_score": {
                                "query": { "ids": { "values": ["/foo"] } },
                                "boost_factor": 2_000_000,
                            }
                        },
                        {
                            "function_score": {
                                "query": { "ids": { "values": ["/bar"] } },
                                "boost_factor": 1_000_000,
                            }
                        },
                    ]
                }
            })
        );
    }

    #[test]
    fn test_lowest_promotion_outranks_boosted_organic_results() {
        let settings = QuerySettings::default();
        let max_format_weight = settings.format_weights.values().copied().fold(1.0, f64::max);
        // Stored popularity is a fraction in (0, 1], so log2p tops out at log10(3).
        let max_popularity_factor = 3.0_f64.log10();
        let lowest_promotion = PROMOTION_BOOST_STEP as f64;
        assert!(lowest_promotion > max_format_weight * max_popularity_factor);

        let index = StubCuratedIndex::with_hits(vec![curated_hit(
            "cheese",
            "exact",
            &[("/foo", 1), ("/bar", 2), ("/baz", 3)],
            &[],
        )]);
        let query = build(&cheese(), &index).query;
        let should = query["bool"]["should"].as_array().unwrap();

        // Format and popularity boosts stay inside the first clause.
        assert_eq!(should[0], organic_query());
        assert!(should[0]["function_score"].get("field_value_factor").is_some());
        assert_eq!(
            should.last().unwrap()["function_score"]["boost_factor"],
            json!(PROMOTION_BOOST_STEP)
        );
    }

    #[test]
    fn test_worst_bet_is_excluded() {
        let index =
            StubCuratedIndex::with_hits(vec![curated_hit("cheese", "exact", &[], &["/foo"])]);
        let query = build(&cheese(), &index).query;
        assert_eq!(
            query,
            json!({
                "bool": {
                    "should": [organic_query()],
                    "must_not": [{ "ids": { "values": ["/foo"] } }],
                }
            })
        );
    }

    #[test]
    fn test_disabled_best_bets_skip_lookup() {
        let index = StubCuratedIndex::with_hits(vec![curated_hit(
            "cheese",
            "exact",
            &[("/foo", 1)],
            &[],
        )]);
        let params = cheese().with_debug(DebugFlags {
            disable_best_bets: true,
            ..DebugFlags::default()
        });
        let query = build(&params, &index).query;
        assert!(query.get("bool").is_none());
        assert_eq!(index.search_calls(), 0);
    }

    #[test]
    fn test_disabled_popularity() {
        let params = cheese().with_debug(DebugFlags {
            disable_popularity: true,
            ..DebugFlags::default()
        });
        let query = build(&params, &no_best_bets()).query;
        assert!(!query.to_string().contains("popularity"));
        assert!(query["function_score"].get("functions").is_some());
    }

    #[test]
    fn test_explain_flag() {
        let params = cheese().with_debug(DebugFlags {
            explain: true,
            ..DebugFlags::default()
        });
        let envelope = build(&params, &no_best_bets());
        assert_eq!(envelope.to_value()["explain"], true);
    }

    #[test]
    fn test_unavailable_best_bets_degrade() {
        let index = StubCuratedIndex::failing(BestBetsError::Timeout { timeout_ms: 500 });
        let query = build(&cheese(), &index).query;
        assert_eq!(query, organic_query());
    }

    #[test]
    fn test_rejected_best_bets_surface() {
        let index = StubCuratedIndex::failing(BestBetsError::Rejected {
            status: 400,
            message: "failed to parse".into(),
        });
        let params = cheese();
        let settings = QuerySettings::default();
        let indices = content_indices();
        let err = QueryBuilder::new(&params, &settings, &indices, &index)
            .payload()
            .unwrap_err();
        assert!(matches!(err, QueryError::BestBets(BestBetsError::Rejected { .. })));
    }

    #[test]
    fn test_similar_to_bypasses_pipeline() {
        let params = cheese().with_similar_to("/vat-rates");
        let index = no_best_bets();
        let query = build(&params, &index).query;
        assert_eq!(query["more_like_this"]["docs"][0]["_id"], "/vat-rates");
        assert_eq!(index.search_calls(), 0);
    }

    #[test]
    fn test_blank_query_matches_everything() {
        let params = SearchParameters::for_query("  ");
        let query = build(&params, &no_best_bets()).query;
        assert_eq!(query, json!({ "match_all": {} }));
    }
}

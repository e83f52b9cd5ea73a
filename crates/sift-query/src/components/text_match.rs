//! Core text matching.
//!
//! Builds the innermost query of the ranking pipeline: how the query text is matched
//! against the weighted text fields, before any boosting.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use crate::SearchParameters;

/// Weighted text fields, highest precision first.
///
/// The weights are part of the ranking contract and must stay strictly decreasing.
pub const FIELD_WEIGHTS: &[(&str, f64)] = &[
    ("title", 6.0),
    ("acronym", 4.0),
    ("description", 2.0),
    ("indexable_content", 1.0),
];

/// Catch-all field holding every indexed text value.
pub const CATCH_ALL_FIELD: &str = "_all";

/// Field holding structured reference codes.
pub const CODE_FIELD: &str = "hmrc_manual_section_id";

/// Analyzer with synonym expansion.
pub const SYNONYM_ANALYZER: &str = "query_default";

/// Analyzer without synonym expansion.
pub const PLAIN_ANALYZER: &str = "default";

/// Analyzer producing word shingles for proximity matching.
pub const SHINGLE_ANALYZER: &str = "shingled_query_analyzer";

/// Minimum-should-match policy for the catch-all term query.
pub const MINIMUM_SHOULD_MATCH: &str = "2<2 3<3 7<50%";

/// Boost for a structured code match.
const CODE_BOOST: f64 = 10.0;

/// Tie breaker for the field-weighting `dis_max` groups.
const TIE_BREAKER: f64 = 0.1;

/// Reference codes: letters followed by digits, optionally one trailing letter.
static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{2,}[0-9]+[A-Za-z]?$").expect("code pattern is a valid regex")
});

/// Builds core match clauses for one search term.
pub struct CoreQuery<'a> {
    /// The trimmed query text.
    term: &'a str,
    /// Analyzer used for the text clauses.
    analyzer: &'static str,
}

impl<'a> CoreQuery<'a> {
    /// Creates a builder for `term`, honouring the synonym debug switch.
    pub fn new(term: &'a str, params: &SearchParameters) -> Self {
        let analyzer = if params.debug.disable_synonyms {
            PLAIN_ANALYZER
        } else {
            SYNONYM_ANALYZER
        };
        Self { term, analyzer }
    }

    /// Picks the match strategy for a free-text search.
    pub fn payload(&self, params: &SearchParameters) -> Value {
        if params.quoted_phrase {
            self.quoted_phrase_query()
        } else if params.new_weighting {
            self.weighted_query()
        } else {
            self.default_query()
        }
    }

    /// Phrase match across the weighted fields, with no term-level fallback.
    pub fn quoted_phrase_query(&self) -> Value {
        json!({
            "multi_match": {
                "query": self.term,
                "type": "phrase",
                "fields": weighted_field_names(),
                "analyzer": self.analyzer,
            }
        })
    }

    /// Disjunction of phrase, all-terms, bigram and catch-all clauses.
    pub fn default_query(&self) -> Value {
        let names: Vec<&str> = FIELD_WEIGHTS.iter().map(|(name, _)| *name).collect();
        let mut should: Vec<Value> = FIELD_WEIGHTS
            .iter()
            .map(|(field, weight)| self.match_phrase(field, *weight))
            .collect();
        should.push(self.match_all_terms(&names));
        should.push(self.match_bigrams(&names));
        should.push(self.minimum_should_match(CATCH_ALL_FIELD));
        self.bool_query(should)
    }

    /// Field-weighting variant: phrase and all-terms clauses grouped per precision level.
    ///
    /// Each group contributes its best field plus a small share of the others, so a match in
    /// several fields does not outrank a better match in one.
    pub fn weighted_query(&self) -> Value {
        let phrases: Vec<Value> = FIELD_WEIGHTS
            .iter()
            .map(|(field, weight)| self.match_phrase(field, *weight))
            .collect();
        let all_terms: Vec<Value> = FIELD_WEIGHTS
            .iter()
            .map(|(field, weight)| self.match_all_terms_in(field, *weight))
            .collect();
        let names: Vec<&str> = FIELD_WEIGHTS.iter().map(|(name, _)| *name).collect();
        let should = vec![
            json!({ "dis_max": { "queries": phrases, "tie_breaker": TIE_BREAKER } }),
            json!({ "dis_max": { "queries": all_terms, "tie_breaker": TIE_BREAKER } }),
            self.match_bigrams(&names),
            self.minimum_should_match(CATCH_ALL_FIELD),
        ];
        self.bool_query(should)
    }

    /// Exact phrase match in one field.
    pub fn match_phrase(&self, field: &str, boost: f64) -> Value {
        json!({
            "match_phrase": {
                field: {
                    "query": self.term,
                    "analyzer": self.analyzer,
                    "boost": boost,
                }
            }
        })
    }

    /// Every term must appear somewhere across `fields`.
    pub fn match_all_terms(&self, fields: &[&str]) -> Value {
        json!({
            "multi_match": {
                "query": self.term,
                "operator": "and",
                "fields": boosted_names(fields),
                "analyzer": self.analyzer,
            }
        })
    }

    /// Every term must appear in one field.
    fn match_all_terms_in(&self, field: &str, boost: f64) -> Value {
        json!({
            "match": {
                field: {
                    "query": self.term,
                    "operator": "and",
                    "analyzer": self.analyzer,
                    "boost": boost,
                }
            }
        })
    }

    /// Rewards adjacent term pairs across `fields`.
    pub fn match_bigrams(&self, fields: &[&str]) -> Value {
        json!({
            "multi_match": {
                "query": self.term,
                "operator": "or",
                "fields": boosted_names(fields),
                "analyzer": SHINGLE_ANALYZER,
            }
        })
    }

    /// Term query that needs only some of the terms to match.
    pub fn minimum_should_match(&self, field: &str) -> Value {
        json!({
            "match": {
                field: {
                    "query": self.term,
                    "analyzer": self.analyzer,
                    "minimum_should_match": MINIMUM_SHOULD_MATCH,
                }
            }
        })
    }

    /// Structured code lookup, present only when the term looks like a reference code.
    pub fn optional_id_code_query(&self) -> Option<Value> {
        if !CODE_PATTERN.is_match(self.term) {
            return None;
        }
        Some(json!({
            "match": {
                CODE_FIELD: {
                    "query": self.term.to_uppercase(),
                    "boost": CODE_BOOST,
                }
            }
        }))
    }

    /// Wraps `should` clauses, adding the code lookup as a `must` when applicable.
    fn bool_query(&self, should: Vec<Value>) -> Value {
        let mut bool_query = json!({ "should": should });
        if let Some(code) = self.optional_id_code_query() {
            bool_query["must"] = json!([code]);
        }
        json!({ "bool": bool_query })
    }
}

/// Names of the weighted fields with their boosts in `field^weight` form.
fn weighted_field_names() -> Vec<String> {
    FIELD_WEIGHTS
        .iter()
        .map(|(field, weight)| format!("{field}^{weight}"))
        .collect()
}

/// Applies the configured boost to each listed field.
fn boosted_names(fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .map(|field| {
            match FIELD_WEIGHTS.iter().find(|(name, _)| name == field) {
                Some((_, weight)) => format!("{field}^{weight}"),
                None => (*field).to_string(),
            }
        })
        .collect()
}

/// Similarity query against a document in every content index.
///
/// Every other request parameter is ignored when this applies.
pub fn more_like_this(id: &str, content_index_names: &[String]) -> Value {
    let docs: Vec<Value> = content_index_names
        .iter()
        .map(|index| json!({ "_type": "edition", "_id": id, "_index": index }))
        .collect();
    json!({ "more_like_this": { "docs": docs } })
}

/// Query matching every document.
pub fn match_all() -> Value {
    json!({ "match_all": {} })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DebugFlags;

    fn core<'a>(term: &'a str, params: &SearchParameters) -> CoreQuery<'a> {
        CoreQuery::new(term, params)
    }

    #[test]
    fn test_field_weights_strictly_decrease() {
        for pair in FIELD_WEIGHTS.windows(2) {
            assert!(pair[0].1 > pair[1].1, "{} <= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn test_quoted_phrase_is_single_clause() {
        let params = SearchParameters::for_query("\"tax return\"");
        let term = params.search_term().unwrap();
        let query = core(term, &params).payload(&params);

        assert_eq!(query["multi_match"]["type"], "phrase");
        assert_eq!(query["multi_match"]["query"], "tax return");
        assert!(query.get("bool").is_none());
        let text = query.to_string();
        assert!(!text.contains(SHINGLE_ANALYZER));
        assert!(!text.contains("minimum_should_match"));
    }

    #[test]
    fn test_unquoted_query_is_full_disjunction() {
        let params = SearchParameters::for_query("tax return");
        let query = core("tax return", &params).payload(&params);

        let should = query["bool"]["should"].as_array().unwrap();
        assert_eq!(should.len(), FIELD_WEIGHTS.len() + 3);
        assert_eq!(should[0]["match_phrase"]["title"]["boost"], 6.0);
        assert_eq!(should[3]["match_phrase"]["indexable_content"]["boost"], 1.0);
        assert_eq!(should[4]["multi_match"]["operator"], "and");
        assert_eq!(should[5]["multi_match"]["analyzer"], SHINGLE_ANALYZER);
        assert_eq!(
            should[6]["match"][CATCH_ALL_FIELD]["minimum_should_match"],
            MINIMUM_SHOULD_MATCH
        );
        assert!(query["bool"].get("must").is_none());
    }

    #[test]
    fn test_weighted_query_groups_clauses() {
        let params = SearchParameters::for_query("tax return").with_new_weighting(true);
        let query = core("tax return", &params).payload(&params);

        let should = query["bool"]["should"].as_array().unwrap();
        assert_eq!(should.len(), 4);
        assert_eq!(
            should[0]["dis_max"]["queries"].as_array().unwrap().len(),
            FIELD_WEIGHTS.len()
        );
        assert_eq!(should[1]["dis_max"]["queries"][0]["match"]["title"]["boost"], 6.0);
    }

    #[test]
    fn test_code_query_only_for_codes() {
        let params = SearchParameters::for_query("cg12345");
        let query = core("cg12345", &params).payload(&params);
        assert_eq!(query["bool"]["must"][0]["match"][CODE_FIELD]["query"], "CG12345");

        let params = SearchParameters::for_query("capital gains");
        let query = core("capital gains", &params).payload(&params);
        assert!(query["bool"].get("must").is_none());
        assert!(core("12345", &params).optional_id_code_query().is_none());
    }

    #[test]
    fn test_synonym_analyzer_toggle() {
        let with = SearchParameters::for_query("cheese");
        let without = SearchParameters::for_query("cheese").with_debug(DebugFlags {
            disable_synonyms: true,
            ..DebugFlags::default()
        });

        assert!(core("cheese", &with).payload(&with).to_string().contains(SYNONYM_ANALYZER));
        assert!(
            !core("cheese", &without)
                .payload(&without)
                .to_string()
                .contains(SYNONYM_ANALYZER)
        );
    }

    #[test]
    fn test_more_like_this_spans_content_indices() {
        let indices = vec!["mainstream".to_string(), "government".to_string()];
        let query = more_like_this("/vat-rates", &indices);
        let docs = query["more_like_this"]["docs"].as_array().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["_index"], "government");
        assert_eq!(docs[0]["_id"], "/vat-rates");
    }
}

//! Injection of curated promotions and demotions into the query.

use serde_json::{Value, json};

use crate::{CuratedOverrides, pipeline::QueryStage};

/// Boost step between consecutive promotion positions.
///
/// Far above anything organic relevance, format weights or popularity can produce, so
/// promoted documents always sort in position order ahead of organic results.
pub const PROMOTION_BOOST_STEP: u64 = 1_000_000;

/// Outermost ranking stage: promotes and demotes curated documents.
pub struct BestBetsWrap {
    /// Overrides resolved for this request.
    overrides: CuratedOverrides,
}

impl BestBetsWrap {
    /// Creates the stage from already-resolved overrides.
    pub fn new(overrides: CuratedOverrides) -> Self {
        Self { overrides }
    }

    /// One additive clause per promotion position, strictly decreasing boosts.
    fn promotion_clauses(&self) -> Vec<Value> {
        let groups = self.overrides.promotion_groups();
        let count = groups.len() as u64;
        groups
            .into_iter()
            .enumerate()
            .map(|(index, (_, links))| {
                json!({
                    "function_score": {
                        "query": { "ids": { "values": links } },
                        "boost_factor": (count - index as u64) * PROMOTION_BOOST_STEP,
                    }
                })
            })
            .collect()
    }
}

impl QueryStage for BestBetsWrap {
    fn name(&self) -> &'static str {
        "best_bets"
    }

    fn wrap(&self, inner: Value) -> Value {
        if self.overrides.is_empty() {
            return inner;
        }

        let mut should = vec![inner];
        should.extend(self.promotion_clauses());
        let mut bool_query = json!({ "should": should });
        if !self.overrides.demotions.is_empty() {
            bool_query["must_not"] = json!([{ "ids": { "values": self.overrides.demotions } }]);
        }
        json!({ "bool": bool_query })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Promotion;

    fn organic() -> Value {
        json!({ "match": { "title": "cheese" } })
    }

    fn wrap(promotions: Vec<Promotion>, demotions: Vec<&str>) -> Value {
        BestBetsWrap::new(CuratedOverrides {
            promotions,
            demotions: demotions.into_iter().map(String::from).collect(),
        })
        .wrap(organic())
    }

    #[test]
    fn test_single_promotion() {
        let query = wrap(vec![Promotion::new("/foo", 1)], vec![]);
        assert_eq!(
            query,
            json!({
                "bool": {
                    "should": [
                        organic(),
                        {
                            "function_score": {
                                "query": { "ids": { "values": ["/foo"] } },
                                "boost_factor": 1_000_000,
                            }
                        }
                    ]
                }
            })
        );
    }

    #[test]
    fn test_two_promotions_keep_rank_order() {
        let query = wrap(
            vec![Promotion::new("/bar", 2), Promotion::new("/foo", 1)],
            vec![],
        );
        let should = query["bool"]["should"].as_array().unwrap();
        assert_eq!(should[1]["function_score"]["query"]["ids"]["values"], json!(["/foo"]));
        assert_eq!(should[1]["function_score"]["boost_factor"], 2_000_000);
        assert_eq!(should[2]["function_score"]["query"]["ids"]["values"], json!(["/bar"]));
        assert_eq!(should[2]["function_score"]["boost_factor"], 1_000_000);
    }

    #[test]
    fn test_demotion_is_excluded() {
        let query = wrap(vec![], vec!["/foo"]);
        assert_eq!(
            query,
            json!({
                "bool": {
                    "should": [organic()],
                    "must_not": [{ "ids": { "values": ["/foo"] } }],
                }
            })
        );
    }

    #[test]
    fn test_no_overrides_is_passthrough() {
        assert_eq!(wrap(vec![], vec![]), organic());
    }

    #[test]
    fn test_gapped_positions_stay_strictly_ordered() {
        let query = wrap(
            vec![
                Promotion::new("/a", 1),
                Promotion::new("/b", 5),
                Promotion::new("/c", 9),
            ],
            vec![],
        );
        let boosts: Vec<u64> = query["bool"]["should"]
            .as_array()
            .unwrap()
            .iter()
            .skip(1)
            .map(|c| c["function_score"]["boost_factor"].as_u64().unwrap())
            .collect();
        assert_eq!(boosts, vec![3_000_000, 2_000_000, 1_000_000]);
    }
}

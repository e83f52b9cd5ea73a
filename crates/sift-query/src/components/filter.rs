//! Field-scoped filters.
//!
//! Filters are rendered once per request into a [`FilterSet`], which both the top-level
//! filter and the facet aggregations read from.

use serde_json::{Value, json};

use crate::{DateFieldFilter, FieldFilter, QuerySettings, SearchParameters, TextFieldFilter};

/// Every filter clause of one request.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    /// Caller filters with the field each one applies to, in request order.
    field_clauses: Vec<(String, Value)>,
    /// Always-applied filters.
    base_clauses: Vec<Value>,
}

impl FilterSet {
    /// Renders the request's filters and the configured base filters.
    pub fn new(params: &SearchParameters, settings: &QuerySettings) -> Self {
        let field_clauses = params
            .filters
            .iter()
            .filter_map(|f| filter_clause(f).map(|clause| (f.field().to_string(), clause)))
            .collect();
        let base_clauses = settings.base_filters.iter().filter_map(filter_clause).collect();
        Self {
            field_clauses,
            base_clauses,
        }
    }

    /// Every clause combined with AND; `None` when nothing filters the request.
    pub fn payload(&self) -> Option<Value> {
        self.combined(None)
    }

    /// Every clause except those on `field`, combined with AND.
    pub fn excluding_field(&self, field: &str) -> Option<Value> {
        self.combined(Some(field))
    }

    /// Returns true if no caller filter targets `field`.
    pub fn is_unfiltered(&self, field: &str) -> bool {
        self.field_clauses.iter().all(|(f, _)| f != field)
    }

    /// Combines caller clauses (optionally skipping one field) with the base clauses.
    fn combined(&self, excluded_field: Option<&str>) -> Option<Value> {
        let clauses: Vec<Value> = self
            .field_clauses
            .iter()
            .filter(|(field, _)| Some(field.as_str()) != excluded_field)
            .map(|(_, clause)| clause.clone())
            .chain(self.base_clauses.iter().cloned())
            .collect();
        combine(clauses, "and")
    }
}

/// Renders one filter; `None` when it has nothing to test.
pub fn filter_clause(filter: &FieldFilter) -> Option<Value> {
    let mut alternatives = Vec::new();
    if filter.includes_missing() {
        alternatives.push(json!({ "missing": { "field": filter.field() } }));
    }
    match filter {
        FieldFilter::Text(text) => alternatives.extend(terms_clause(text)),
        FieldFilter::Date(date) => alternatives.extend(range_clause(date)),
    }

    let clause = combine(alternatives, "or")?;
    Some(if filter.is_reject() {
        json!({ "not": clause })
    } else {
        clause
    })
}

/// Membership test over the accepted values.
fn terms_clause(filter: &TextFieldFilter) -> Option<Value> {
    if filter.values.is_empty() {
        return None;
    }
    Some(json!({ "terms": { filter.field.as_str(): filter.values } }))
}

/// Inclusive range test; open bounds are omitted.
fn range_clause(filter: &DateFieldFilter) -> Option<Value> {
    if filter.range.is_unbounded() {
        return None;
    }
    let mut bounds = json!({});
    if let Some(from) = filter.range.from {
        bounds["from"] = json!(from.format("%Y-%m-%d").to_string());
    }
    if let Some(to) = filter.range.to {
        bounds["to"] = json!(to.format("%Y-%m-%d").to_string());
    }
    Some(json!({ "range": { filter.field.as_str(): bounds } }))
}

/// Joins clauses under `op`, collapsing the empty and single-clause cases.
fn combine(mut clauses: Vec<Value>, op: &str) -> Option<Value> {
    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(json!({ op: clauses })),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::DateRange;

    fn text(field: &str, values: &[&str]) -> FieldFilter {
        FieldFilter::text(field, values.iter().map(|v| v.to_string()).collect())
    }

    fn settings_with_base(base: Vec<FieldFilter>) -> QuerySettings {
        QuerySettings {
            base_filters: base,
            ..QuerySettings::default()
        }
    }

    fn filters(params: SearchParameters, settings: &QuerySettings) -> FilterSet {
        FilterSet::new(&params, settings)
    }

    #[test]
    fn test_unfiltered_request_has_no_filter() {
        let set = filters(SearchParameters::for_query("cheese"), &QuerySettings::default());
        assert_eq!(set.payload(), None);
    }

    #[test]
    fn test_single_filter_with_several_values() {
        let params = SearchParameters::for_query("cheese")
            .with_filters(vec![text("organisations", &["hm-magic", "hmrc"])]);
        let set = filters(params, &QuerySettings::default());
        assert_eq!(
            set.payload(),
            Some(json!({ "terms": { "organisations": ["hm-magic", "hmrc"] } }))
        );
    }

    #[test]
    fn test_multiple_filters_combine_with_and() {
        let params = SearchParameters::for_query("cheese").with_filters(vec![
            text("organisations", &["hm-magic", "hmrc"]),
            text("section", &["levitation"]),
        ]);
        let set = filters(params, &QuerySettings::default());
        assert_eq!(
            set.payload(),
            Some(json!({
                "and": [
                    { "terms": { "organisations": ["hm-magic", "hmrc"] } },
                    { "terms": { "section": ["levitation"] } },
                ]
            }))
        );
    }

    #[test]
    fn test_base_filters_are_appended() {
        let settings = settings_with_base(vec![text("is_withdrawn", &["true"]).rejecting()]);
        let base = json!({ "not": { "terms": { "is_withdrawn": ["true"] } } });

        let unfiltered = filters(SearchParameters::for_query("cheese"), &settings);
        assert_eq!(unfiltered.payload(), Some(base.clone()));

        let params = SearchParameters::for_query("cheese").with_filters(vec![
            text("organisations", &["hm-magic", "hmrc"]),
            text("section", &["levitation"]),
        ]);
        let set = filters(params, &settings);
        assert_eq!(
            set.payload(),
            Some(json!({
                "and": [
                    { "terms": { "organisations": ["hm-magic", "hmrc"] } },
                    { "terms": { "section": ["levitation"] } },
                    base,
                ]
            }))
        );
    }

    #[test]
    fn test_reject_negates() {
        let clause = filter_clause(&text("format", &["contact"]).rejecting()).unwrap();
        assert_eq!(clause, json!({ "not": { "terms": { "format": ["contact"] } } }));
    }

    #[test]
    fn test_include_missing_ors_with_value_test() {
        let clause = filter_clause(&text("section", &["tax"]).including_missing()).unwrap();
        assert_eq!(
            clause,
            json!({
                "or": [
                    { "missing": { "field": "section" } },
                    { "terms": { "section": ["tax"] } },
                ]
            })
        );
    }

    #[test]
    fn test_date_range() {
        let range = DateRange {
            from: NaiveDate::from_ymd_opt(2014, 4, 1),
            to: None,
        };
        let clause = filter_clause(&FieldFilter::date("public_timestamp", range)).unwrap();
        assert_eq!(
            clause,
            json!({ "range": { "public_timestamp": { "from": "2014-04-01" } } })
        );
    }

    #[test]
    fn test_empty_filters_produce_nothing() {
        assert_eq!(filter_clause(&text("section", &[])), None);
        assert_eq!(
            filter_clause(&FieldFilter::date("public_timestamp", DateRange::default())),
            None
        );
    }

    #[test]
    fn test_excluding_field() {
        let params = SearchParameters::for_query("cheese").with_filters(vec![
            text("organisations", &["hm-magic"]),
            text("section", &["levitation"]),
        ]);
        let set = filters(params, &QuerySettings::default());
        assert_eq!(
            set.excluding_field("organisations"),
            Some(json!({ "terms": { "section": ["levitation"] } }))
        );
        assert!(!set.is_unfiltered("section"));
        assert!(set.is_unfiltered("format"));
    }
}

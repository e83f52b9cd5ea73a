//! Search parameters consumed by the query builder.
//!
//! A [`SearchParameters`] value is produced and validated upstream (request parsing is not
//! this crate's job) and is read-only from here on. Every query component borrows it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default page size when a caller does not ask for one.
pub const DEFAULT_COUNT: usize = 10;

/// Validated search request.
///
/// Exactly one of `similar_to`, `query`, or neither (match everything) drives the core query;
/// `similar_to` wins when both are present.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParameters {
    /// Free-text query.
    pub query: Option<String>,
    /// Identifier of a document to find similar documents to.
    pub similar_to: Option<String>,
    /// Offset of the first result.
    pub start: usize,
    /// Number of results to return (always greater than zero).
    pub count: usize,
    /// Fields requested by the caller, in request order.
    pub return_fields: Vec<String>,
    /// Field filters, in request order.
    pub filters: Vec<FieldFilter>,
    /// Explicit ordering; `None` ranks by relevance.
    pub order: Option<SortOrder>,
    /// Requested facets keyed by field name.
    pub facets: BTreeMap<String, FacetRequest>,
    /// Debugging switches.
    pub debug: DebugFlags,
    /// Whether the query text is a quoted phrase.
    pub quoted_phrase: bool,
    /// Whether to use the alternative field-weighting text query.
    pub new_weighting: bool,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            query: None,
            similar_to: None,
            start: 0,
            count: DEFAULT_COUNT,
            return_fields: Vec::new(),
            filters: Vec::new(),
            order: None,
            facets: BTreeMap::new(),
            debug: DebugFlags::default(),
            quoted_phrase: false,
            new_weighting: false,
        }
    }
}

impl SearchParameters {
    /// Creates parameters for a free-text query.
    ///
    /// The quoted-phrase flag is derived from the text.
    pub fn for_query(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            quoted_phrase: Self::is_quoted_phrase(&query),
            query: Some(query),
            ..Self::default()
        }
    }

    /// Returns true when the whole text is wrapped in double quotes.
    pub fn is_quoted_phrase(text: &str) -> bool {
        let trimmed = text.trim();
        trimmed.len() > 2
            && trimmed.starts_with('"')
            && trimmed.ends_with('"')
            && !trimmed[1..trimmed.len() - 1].contains('"')
    }

    /// Returns the query text with surrounding whitespace (and phrase quotes) stripped.
    ///
    /// Blank queries are treated as absent.
    pub fn search_term(&self) -> Option<&str> {
        let text = self.query.as_deref()?.trim();
        let text = if self.quoted_phrase {
            text.trim_matches('"').trim()
        } else {
            text
        };
        (!text.is_empty()).then_some(text)
    }

    /// Returns true if the caller asked for `field` to be returned.
    pub fn field_requested(&self, field: &str) -> bool {
        self.return_fields.iter().any(|f| f == field)
    }

    /// Sets the pagination window.
    pub fn with_page(mut self, start: usize, count: usize) -> Self {
        self.start = start;
        self.count = count;
        self
    }

    /// Sets the requested return fields.
    pub fn with_return_fields(mut self, fields: Vec<String>) -> Self {
        self.return_fields = fields;
        self
    }

    /// Sets the field filters.
    pub fn with_filters(mut self, filters: Vec<FieldFilter>) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the ordering.
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Adds a facet request.
    pub fn with_facet(mut self, field: impl Into<String>, facet: FacetRequest) -> Self {
        self.facets.insert(field.into(), facet);
        self
    }

    /// Sets the debug flags.
    pub fn with_debug(mut self, debug: DebugFlags) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the "similar to" document identifier.
    pub fn with_similar_to(mut self, id: impl Into<String>) -> Self {
        self.similar_to = Some(id.into());
        self
    }

    /// Enables the alternative field-weighting text query.
    pub fn with_new_weighting(mut self, enabled: bool) -> Self {
        self.new_weighting = enabled;
        self
    }
}

/// Debugging switches carried on a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugFlags {
    /// Skip curated result overrides.
    pub disable_best_bets: bool,
    /// Skip the popularity boost.
    pub disable_popularity: bool,
    /// Analyze the query without synonym expansion.
    pub disable_synonyms: bool,
    /// Ask the engine to explain scoring.
    pub explain: bool,
}

/// A filter on one field.
///
/// Each variant carries its own payload; builders switch on the variant rather than on
/// field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFilter {
    /// Field value must be one of a set of strings.
    Text(TextFieldFilter),
    /// Field value must fall within a date range.
    Date(DateFieldFilter),
}

impl FieldFilter {
    /// Creates a text membership filter.
    pub fn text(field: impl Into<String>, values: Vec<String>) -> Self {
        Self::Text(TextFieldFilter {
            field: field.into(),
            values,
            reject: false,
            include_missing: false,
        })
    }

    /// Creates a date range filter.
    pub fn date(field: impl Into<String>, range: DateRange) -> Self {
        Self::Date(DateFieldFilter {
            field: field.into(),
            range,
            reject: false,
            include_missing: false,
        })
    }

    /// Returns the filtered field name.
    pub fn field(&self) -> &str {
        match self {
            Self::Text(f) => &f.field,
            Self::Date(f) => &f.field,
        }
    }

    /// Returns true if the filter excludes matching documents instead of selecting them.
    pub fn is_reject(&self) -> bool {
        match self {
            Self::Text(f) => f.reject,
            Self::Date(f) => f.reject,
        }
    }

    /// Returns true if documents without the field should also be accepted.
    pub fn includes_missing(&self) -> bool {
        match self {
            Self::Text(f) => f.include_missing,
            Self::Date(f) => f.include_missing,
        }
    }

    /// Turns this filter into a rejecting one.
    pub fn rejecting(mut self) -> Self {
        match &mut self {
            Self::Text(f) => f.reject = true,
            Self::Date(f) => f.reject = true,
        }
        self
    }

    /// Makes this filter also accept documents that lack the field.
    pub fn including_missing(mut self) -> Self {
        match &mut self {
            Self::Text(f) => f.include_missing = true,
            Self::Date(f) => f.include_missing = true,
        }
        self
    }
}

/// Membership filter over string values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFieldFilter {
    /// Field name.
    pub field: String,
    /// Accepted values, in request order.
    pub values: Vec<String>,
    /// Negate the filter.
    pub reject: bool,
    /// Also accept documents lacking the field.
    pub include_missing: bool,
}

/// Range filter over a date field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFieldFilter {
    /// Field name.
    pub field: String,
    /// Accepted range.
    pub range: DateRange,
    /// Negate the filter.
    pub reject: bool,
    /// Also accept documents lacking the field.
    pub include_missing: bool,
}

/// Inclusive date range; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Earliest accepted date.
    pub from: Option<NaiveDate>,
    /// Latest accepted date.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Returns true if neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// Wire name of the direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Requested ordering on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    /// Field to order by.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortOrder {
    /// Creates an ordering.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// How a facet's counts relate to active filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetScope {
    /// Ignore the filter on the facet's own field, apply every other filter.
    #[default]
    ExcludeFieldFilter,
    /// Apply every active filter, including the one on the facet's own field.
    AllFilters,
}

/// A requested facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetRequest {
    /// Number of facet values the caller wants to display.
    pub requested: usize,
    /// Filter scoping mode.
    pub scope: FacetScope,
}

impl FacetRequest {
    /// Creates a facet request.
    pub fn new(requested: usize, scope: FacetScope) -> Self {
        Self { requested, scope }
    }
}

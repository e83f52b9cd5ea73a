//! Query construction and relevance ranking for sift search.
//!
//! Turns validated [`SearchParameters`] into a [`QueryEnvelope`] ready to be sent to the
//! index engine. The query tree is built in fixed layers:
//!
//! - **Core text match**: phrase, all-terms, bigram and catch-all clauses over weighted fields
//! - **Format boost**: a static multiplier per document format
//! - **Popularity**: logarithmic blend of the document's popularity
//! - **Best bets**: curated promotions and demotions, outermost
//!
//! Filters, facet aggregations, sorting and highlighting are built alongside. The only
//! I/O is the curated-overrides lookup, reached through the [`CuratedIndex`] trait.
//!
//! # Example
//!
//! ```
//! use serde_json::Value;
//! use sift_query::{BestBetsError, CuratedIndex, QueryBuilder, QuerySettings, SearchParameters};
//!
//! struct NoCuratedEntries;
//!
//! impl CuratedIndex for NoCuratedEntries {
//!     fn analyze(&self, text: &str) -> Result<String, BestBetsError> {
//!         Ok(text.to_lowercase())
//!     }
//!
//!     fn raw_search(&self, _payload: &Value) -> Result<Vec<Value>, BestBetsError> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! let params = SearchParameters::for_query("self assessment");
//! let settings = QuerySettings::default();
//! let indices = vec!["mainstream".to_string()];
//! let envelope = QueryBuilder::new(&params, &settings, &indices, &NoCuratedEntries)
//!     .payload()
//!     .unwrap();
//! assert_eq!(envelope.size, 10);
//! assert!(envelope.filter.is_none());
//! ```

#![warn(missing_docs)]

mod builder;
pub mod components;
mod curated;
mod error;
mod params;
pub mod pipeline;
mod settings;
#[cfg(test)]
mod test_support;

pub use builder::{DEPENDENCY_FIELDS, QueryBuilder, QueryEnvelope};
pub use curated::{
    BestBetsResolver, CuratedEntry, CuratedIndex, CuratedOverrides, MatchType, Promotion,
    STEMMED_KEY_FIELD, pad,
};
pub use error::{BestBetsError, MalformedCuratedEntry, QueryError};
pub use params::{
    DEFAULT_COUNT, DateFieldFilter, DateRange, DebugFlags, FacetRequest, FacetScope, FieldFilter,
    SearchParameters, SortDirection, SortOrder, TextFieldFilter,
};
pub use settings::{
    DEFAULT_FACET_SIZE_CEILING, DEFAULT_MAX_CURATED_CANDIDATES, DEFAULT_POPULARITY_FIELD,
    QuerySettings, default_format_weights,
};

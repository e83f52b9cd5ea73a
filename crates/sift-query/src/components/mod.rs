//! Query components.
//!
//! Each component is a pure function of the request and the shared settings. The boosting
//! components implement [`QueryStage`](crate::pipeline::QueryStage) and are composed by the
//! ranking pipeline; the rest contribute their own envelope keys.

mod aggregates;
mod best_bets;
mod booster;
mod filter;
mod highlight;
mod popularity;
mod sort;
mod text_match;

pub use self::{
    aggregates::{Aggregates, FILTERED_AGGREGATION, MISSING_SUFFIX},
    best_bets::{BestBetsWrap, PROMOTION_BOOST_STEP},
    booster::{FORMAT_FIELD, FormatBoost},
    filter::{FilterSet, filter_clause},
    highlight::{HIGHLIGHTED_DESCRIPTION, HIGHLIGHTED_TITLE, highlight},
    popularity::PopularityBoost,
    sort::sort_clauses,
    text_match::{
        CATCH_ALL_FIELD, CODE_FIELD, CoreQuery, FIELD_WEIGHTS, PLAIN_ANALYZER, SYNONYM_ANALYZER,
        match_all, more_like_this,
    },
};

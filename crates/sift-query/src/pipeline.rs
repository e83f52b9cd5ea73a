//! The ranking pipeline.
//!
//! Boosting is a fixed sequence of stages, each wrapping the query produced by the stage
//! before it:
//!
//! ```text
//! core text match -> format boost -> popularity -> best bets
//! ```
//!
//! Best bets end up outermost, so promotions and demotions act on the already boosted
//! relevance and no boost can bring back a demoted document.

use serde_json::Value;
use tracing::debug;

use crate::components::{BestBetsWrap, FormatBoost, PopularityBoost};

/// One query transformation.
pub trait QueryStage {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Wraps `inner`, returning the transformed query.
    fn wrap(&self, inner: Value) -> Value;
}

/// The ranking stages in their required order.
pub struct RankingPipeline<'a> {
    /// Innermost boost.
    format: FormatBoost<'a>,
    /// Middle boost.
    popularity: PopularityBoost<'a>,
    /// Outermost override.
    best_bets: BestBetsWrap,
}

impl<'a> RankingPipeline<'a> {
    /// Assembles the pipeline from its stages.
    pub fn new(
        format: FormatBoost<'a>,
        popularity: PopularityBoost<'a>,
        best_bets: BestBetsWrap,
    ) -> Self {
        Self {
            format,
            popularity,
            best_bets,
        }
    }

    /// Runs `core` through every stage.
    pub fn run(&self, core: Value) -> Value {
        let stages: [&dyn QueryStage; 3] = [&self.format, &self.popularity, &self.best_bets];
        stages.iter().fold(core, |query, stage| {
            debug!(stage = stage.name(), "applying ranking stage");
            stage.wrap(query)
        })
    }
}

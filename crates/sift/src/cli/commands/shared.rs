//! Shared helpers for command implementations.

use std::process::ExitCode;

use sift_query::{QueryBuilder, QueryEnvelope, SearchParameters};

use crate::cli::context::CommandContext;

/// Builds the query envelope for `params`, reporting failures as an exit code.
///
/// Used by `search` and `payload`.
pub fn build_envelope(
    ctx: &CommandContext,
    params: &SearchParameters,
) -> Result<QueryEnvelope, ExitCode> {
    let settings = ctx.query_settings();
    let metasearch = ctx.metasearch()?;
    QueryBuilder::new(
        params,
        &settings,
        &ctx.config.search.content_indices,
        &metasearch,
    )
    .payload()
    .map_err(|e| {
        eprintln!("error: failed to build query: {e}");
        ExitCode::FAILURE
    })
}

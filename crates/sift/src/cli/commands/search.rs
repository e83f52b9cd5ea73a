//! Implementation of `sift search`.

use std::process::ExitCode;

use tracing::debug;

use super::shared::build_envelope;
use crate::cli::{
    args::SearchCommand,
    context::CommandContext,
    output::{format_results, print_json},
};

/// Builds the query, runs it against the selected backends and prints the hits.
pub fn run(ctx: &CommandContext, cmd: &SearchCommand) -> ExitCode {
    let backends = if cmd.backends.is_empty() {
        vec![ctx.config.search.default_backend.clone()]
    } else {
        cmd.backends.clone()
    };

    // Unknown names fail before anything is sent to the engine.
    let target = match ctx.registry().resolve_multi(&backends) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let params = cmd.query.to_params();
    let envelope = match build_envelope(ctx, &params) {
        Ok(envelope) => envelope,
        Err(code) => return code,
    };
    debug!(target_indices = %target.path_segment(), "running search");

    let searcher = match ctx.searcher() {
        Ok(searcher) => searcher,
        Err(code) => return code,
    };
    let response = match searcher.search(&target, &envelope) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("error: search failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.json {
        return print_json(&response, &ctx.highlighter());
    }
    print!("{}", format_results(&response, &params));
    ExitCode::SUCCESS
}

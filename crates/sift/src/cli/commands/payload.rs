//! Implementation of `sift payload`.

use std::process::ExitCode;

use super::shared::build_envelope;
use crate::cli::{args::PayloadCommand, context::CommandContext, output::print_json};

/// Prints the query envelope that `search` would send.
pub fn run(ctx: &CommandContext, cmd: &PayloadCommand) -> ExitCode {
    let envelope = match build_envelope(ctx, &cmd.query.to_params()) {
        Ok(envelope) => envelope,
        Err(code) => return code,
    };

    if !cmd.compact {
        return print_json(&envelope, &ctx.highlighter());
    }
    match serde_json::to_string(&envelope) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

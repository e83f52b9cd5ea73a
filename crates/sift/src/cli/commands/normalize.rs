//! Implementation of `sift normalize`.

use std::process::ExitCode;

use sift_query::pad;

use crate::cli::{args::NormalizeCommand, context::CommandContext};

/// Prints the best-bet key the engine's analyzer produces for the given text.
pub fn run(ctx: &CommandContext, cmd: &NormalizeCommand) -> ExitCode {
    let metasearch = match ctx.metasearch() {
        Ok(metasearch) => metasearch,
        Err(code) => return code,
    };

    let text = cmd.text.join(" ");
    match metasearch.normalize(&text) {
        Ok(key) if cmd.padded => {
            println!("{}", pad(&key));
            ExitCode::SUCCESS
        }
        Ok(key) => {
            println!("{key}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: analysis failed: {e}");
            ExitCode::FAILURE
        }
    }
}

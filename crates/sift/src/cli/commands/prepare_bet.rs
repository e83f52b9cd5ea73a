//! Implementation of `sift prepare-bet`.

use std::{
    fs,
    io::{self, Read},
    process::ExitCode,
};

use serde_json::Value;
use sift_index::CuratedEntryPreparer;

use crate::cli::{args::PrepareBetCommand, context::CommandContext, output::print_json};

/// Reads a curated entry document, fills in its best-bet key and prints it.
pub fn run(ctx: &CommandContext, cmd: &PrepareBetCommand) -> ExitCode {
    let input = match &cmd.file {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            eprintln!("error: failed to read {}: {e}", path.display());
        }),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map(|_| buf)
                .map_err(|e| {
                    eprintln!("error: failed to read stdin: {e}");
                })
        }
    };
    let Ok(input) = input else {
        return ExitCode::FAILURE;
    };

    let doc: Value = match serde_json::from_str(&input) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("error: input is not valid JSON: {e}");
            return ExitCode::FAILURE;
        }
    };

    let metasearch = match ctx.metasearch() {
        Ok(metasearch) => metasearch,
        Err(code) => return code,
    };
    match CuratedEntryPreparer::new(&metasearch).prepare(doc) {
        Ok(prepared) => print_json(&prepared, &ctx.highlighter()),
        Err(e) => {
            eprintln!("error: failed to prepare entry: {e}");
            ExitCode::FAILURE
        }
    }
}

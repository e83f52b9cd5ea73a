//! sift: relevance-ranked search over a document index engine.
//!
//! Builds search queries from command-line parameters, applies curated best bets, format and
//! popularity boosts, and runs them against the configured backends.

mod cli;

use std::{io, process::ExitCode};

use tracing_subscriber::EnvFilter;

use crate::cli::{
    CommandContext,
    args::{Commands, parse_cli},
    commands,
};

fn main() -> ExitCode {
    let cli = parse_cli();
    init_logging(cli.verbose);

    let load = if matches!(cli.command, Commands::Init(_)) {
        CommandContext::load_cwd_only(cli.plain)
    } else {
        CommandContext::load(cli.plain)
    };
    let ctx = match load {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    commands::run(cli.command, &ctx)
}

/// Sends log events to stderr, at `warn` unless `RUST_LOG` or `-v` say otherwise.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    } else {
        EnvFilter::new(default_level)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

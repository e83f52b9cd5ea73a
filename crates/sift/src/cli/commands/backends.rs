//! Implementation of `sift backends`.

use std::process::ExitCode;

use crate::cli::{
    context::CommandContext,
    output::{backends_table, dim},
};

/// Lists configured backends and the indices each one searches.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let registry = ctx.registry();
    if registry.backends().next().is_none() {
        println!("{}", dim("No backends configured."));
        return ExitCode::SUCCESS;
    }

    println!(
        "{}",
        backends_table(&registry, &ctx.config.search.default_backend)
    );
    ExitCode::SUCCESS
}

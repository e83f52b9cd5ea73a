//! Command implementations and dispatch.

pub mod backends;
pub mod check;
pub mod config;
pub mod init;
pub mod normalize;
pub mod payload;
pub mod prepare_bet;
pub mod search;
mod shared;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Search(cmd) => search::run(ctx, &cmd),
        Commands::Payload(cmd) => payload::run(ctx, &cmd),
        Commands::Normalize(cmd) => normalize::run(ctx, &cmd),
        Commands::PrepareBet(cmd) => prepare_bet::run(ctx, &cmd),
        Commands::Backends => backends::run(ctx),
        Commands::Init(cmd) => init::run(ctx, &cmd),
        Commands::Config => config::run(ctx),
        Commands::Check => check::run(ctx),
    }
}

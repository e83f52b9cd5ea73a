//! Implementation of `sift config`.

use std::process::ExitCode;

use crate::cli::context::CommandContext;

/// Shows effective configuration settings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let highlighter = ctx.highlighter();
    print!(
        "{}",
        highlighter.highlight_toml(&ctx.config.settings_to_toml())
    );
    ExitCode::SUCCESS
}

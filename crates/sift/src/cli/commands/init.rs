//! Implementation of `sift init`.

use std::{fs, process::ExitCode};

use sift_config::{
    CONFIG_FILENAME, global_config_path, global_template, local_template,
    require_global_config_path,
};
use sift_highlight::indent_content;

use crate::cli::{args::InitCommand, context::CommandContext, output::subheader};

/// Writes a commented `.sift.toml` template.
pub fn run(ctx: &CommandContext, cmd: &InitCommand) -> ExitCode {
    let cwd = &ctx.cwd;

    let is_home_dir = global_config_path()
        .and_then(|p| p.parent().map(|h| h == cwd))
        .unwrap_or(false);

    let use_global = cmd.global || is_home_dir;

    let config_path = if use_global {
        match require_global_config_path() {
            Ok(path) => path,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        cwd.join(CONFIG_FILENAME)
    };

    if config_path.exists() && !cmd.force {
        eprintln!(
            "error: configuration file already exists: {}",
            config_path.display()
        );
        eprintln!("use --force to overwrite");
        return ExitCode::FAILURE;
    }

    let template = if use_global {
        global_template()
    } else {
        local_template()
    };

    if let Err(e) = fs::write(&config_path, &template) {
        eprintln!("error: failed to write {}: {e}", config_path.display());
        return ExitCode::FAILURE;
    }

    println!("Created {}", config_path.display());
    println!();
    println!("{}", subheader("Configuration written:"));
    let highlighted = ctx.highlighter().highlight_toml(&template);
    println!("{}", indent_content(&highlighted));

    ExitCode::SUCCESS
}

//! Implementation of `sift check`.

use std::process::ExitCode;

use sift_config::{ConfigWarning, discover_config_files, is_global_config};

use crate::cli::{
    context::CommandContext,
    output::{dim, subheader, success, warning},
};

/// Lists the configuration files in effect, then validates the merged configuration.
///
/// Exits with failure when any warning is reported.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config_files = discover_config_files(&ctx.cwd);

    println!("Checking configuration...");
    println!();

    if config_files.is_empty() {
        println!("{}", dim("No configuration files found, using defaults."));
        println!();
    } else {
        println!("{}", subheader("Config files:"));
        for path in &config_files {
            if is_global_config(path) {
                println!("   {} {}", path.display(), dim("(global)"));
            } else {
                println!("   {}", path.display());
            }
        }
        println!();
    }

    let config = &ctx.config;
    println!("{}", subheader("Engine:"));
    println!("   {}", config.engine.url);
    println!();

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("{}", success("No issues found."));
        return ExitCode::SUCCESS;
    }

    println!("{}", subheader(&format!("Warnings ({}):", warnings.len())));
    for w in &warnings {
        println!("   - {}", warning(&w.to_string()));
    }
    println!();

    print_hints(&warnings);

    ExitCode::FAILURE
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    let mut hints: Vec<&str> = warnings
        .iter()
        .map(|w| match w {
            ConfigWarning::EmptyBackend { .. } => {
                "List at least one index for every backend, or remove it."
            }
            ConfigWarning::UnroutedContentIndex { .. }
            | ConfigWarning::UnroutedBestBetsIndex { .. } => {
                "Add the index to a [backends] entry so it can be searched."
            }
            ConfigWarning::UndefinedDefaultBackend { .. } => {
                "Set search.default_backend to a name defined in [backends]."
            }
            ConfigWarning::EngineUrlNotHttp { .. } => {
                "engine.url needs a scheme, e.g. http://localhost:9200."
            }
            ConfigWarning::NonPositiveFormatWeight { .. } => {
                "Format weights multiply relevance; use a value above zero."
            }
            ConfigWarning::EmptyBaseFilter { .. } => {
                "Give every [[base_filters]] entry at least one value."
            }
        })
        .collect();

    hints.sort_unstable();
    hints.dedup();

    println!("{}", subheader("Hints:"));
    for hint in hints {
        println!("   - {}", dim(hint));
    }
}

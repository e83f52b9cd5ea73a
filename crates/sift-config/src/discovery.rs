//! Locating `.sift.toml` files.
//!
//! A search deployment usually keeps one file next to the service and may override parts of
//! it in subdirectories (per environment, per operator). Lookup walks from the working
//! directory towards the filesystem root and ends with the user's `~/.sift.toml`.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::{ConfigError, parse::is_root_config};

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".sift.toml";

/// Every configuration file that applies in `cwd`, most specific first.
///
/// A file declaring `root = true` is the last one read: directories above it and the global
/// file are ignored.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    let mut configs: Vec<PathBuf> = Vec::new();

    for candidate in cwd.ancestors().map(|dir| dir.join(CONFIG_FILENAME)) {
        if !candidate.is_file() {
            continue;
        }
        let stops_here = is_root_config(&candidate);
        configs.push(candidate);
        if stops_here {
            return configs;
        }
    }

    match global_config_path() {
        Some(global) if global.is_file() && !configs.contains(&global) => configs.push(global),
        _ => {}
    }
    configs
}

/// `~/.sift.toml`, or `None` without a home directory.
pub fn global_config_path() -> Option<PathBuf> {
    let dirs = BaseDirs::new()?;
    Some(dirs.home_dir().join(CONFIG_FILENAME))
}

/// [`global_config_path`] for callers that must write there.
pub fn require_global_config_path() -> Result<PathBuf, ConfigError> {
    global_config_path().ok_or(ConfigError::NoHomeDirectory)
}

/// Returns true if `path` is the global configuration file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}

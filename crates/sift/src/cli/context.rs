//! Shared context for running CLI commands.

use std::{
    env,
    io::{self, IsTerminal},
    path::{Path, PathBuf},
    process::ExitCode,
};

use sift_config::{BaseFilter, Config};
use sift_highlight::Highlighter;
use sift_index::{EngineClient, MetasearchIndex, Registry, Searcher};
use sift_query::{FieldFilter, QuerySettings};

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
    /// Whether JSON and TOML output is highlighted.
    color: bool,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load(plain: bool) -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        Ok(Self {
            cwd,
            config,
            color: use_color(plain),
        })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used for `init`, which should work even when an existing config file is invalid.
    pub fn load_cwd_only(plain: bool) -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
            color: use_color(plain),
        })
    }

    /// Highlighter honoring `--plain` and whether stdout is a terminal.
    pub fn highlighter(&self) -> Highlighter {
        Highlighter::with_color(self.color)
    }

    /// Query construction settings derived from the configuration.
    pub fn query_settings(&self) -> QuerySettings {
        QuerySettings {
            format_weights: self.config.boost.formats.clone(),
            base_filters: self.config.base_filters.iter().map(base_filter).collect(),
            facet_size_ceiling: self.config.search.facet_size_ceiling,
            popularity_field: self.config.search.popularity_field.clone(),
            max_curated_candidates: self.config.best_bets.max_candidates,
        }
    }

    /// Index registry built from the configured backends.
    pub fn registry(&self) -> Registry {
        Registry::from_config(&self.config)
    }

    /// The curated-overrides index.
    pub fn metasearch(&self) -> Result<MetasearchIndex, ExitCode> {
        MetasearchIndex::from_config(&self.config).map_err(|e| {
            eprintln!("error: failed to create engine client: {e}");
            ExitCode::FAILURE
        })
    }

    /// A searcher using the engine timeout.
    pub fn searcher(&self) -> Result<Searcher, ExitCode> {
        EngineClient::from_config(&self.config)
            .map(Searcher::new)
            .map_err(|e| {
                eprintln!("error: failed to create engine client: {e}");
                ExitCode::FAILURE
            })
    }
}

/// Converts a configured base filter into a query filter.
fn base_filter(filter: &BaseFilter) -> FieldFilter {
    let mut converted = FieldFilter::text(filter.field.as_str(), filter.values.clone());
    if filter.reject {
        converted = converted.rejecting();
    }
    if filter.include_missing {
        converted = converted.including_missing();
    }
    converted
}

/// Highlight only when asked to and stdout is a terminal.
fn use_color(plain: bool) -> bool {
    !plain && io::stdout().is_terminal()
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}

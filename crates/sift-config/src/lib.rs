//! Configuration system for sift.
//!
//! sift uses TOML configuration files named `.sift.toml`. Configuration is resolved by walking
//! up the directory tree from the current working directory, collecting any `.sift.toml` files
//! found, then loading `~/.sift.toml` as the global config with lowest precedence.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use discovery::{
    CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config,
    require_global_config_path,
};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawBaseFilter, RawBestBetsSettings, RawBoostSettings, RawConfig, RawEngineSettings,
    RawSearchSettings, parse_config_file, parse_config_str,
};
use serde::{Deserialize, Serialize};
pub use templates::{global_template, local_template};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Top-level merged configuration for sift.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.sift.toml` files according to precedence rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Index engine connection.
    pub engine: EngineSettings,
    /// Curated overrides lookup.
    pub best_bets: BestBetsSettings,
    /// Query construction settings.
    pub search: SearchSettings,
    /// Backend name -> physical index names, in configured order.
    pub backends: BTreeMap<String, Vec<String>>,
    /// Relevance boosts.
    pub boost: BoostSettings,
    /// Filters applied to every request.
    pub base_filters: Vec<BaseFilter>,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            best_bets: BestBetsSettings::default(),
            search: SearchSettings::default(),
            backends: default_backends(),
            boost: BoostSettings::default(),
            base_filters: Vec::new(),
            config_root: None,
        }
    }
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.sift.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(merge_configs(&parsed))
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// This checks for:
    /// - Backends that list no indices
    /// - Content or best bets indices that no backend routes to
    /// - Engine URLs that are not http(s)
    /// - Format weights that are not positive
    /// - Base filters without values
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Every physical index named by any backend, sorted and deduplicated.
    pub fn physical_indices(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .backends
            .values()
            .flatten()
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// The output has the same shape as a `.sift.toml` file.
    pub fn settings_to_toml(&self) -> String {
        let serializable = SerializableSettings {
            engine: &self.engine,
            best_bets: &self.best_bets,
            search: &self.search,
            backends: &self.backends,
            boost: &self.boost,
            base_filters: &self.base_filters,
        };
        toml::to_string_pretty(&serializable).expect("settings serialization should not fail")
    }
}

/// Index engine connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Base URL of the index engine.
    pub url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            url: String::from("http://localhost:9200"),
            timeout_ms: 5000,
        }
    }
}

/// Curated overrides lookup settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BestBetsSettings {
    /// Name of the curated overrides index.
    pub index: String,
    /// Analyzer producing best bet keys.
    pub analyzer: String,
    /// Timeout for the lookup and analysis calls, in milliseconds.
    pub timeout_ms: u64,
    /// Upper bound on candidate entries fetched per query.
    pub max_candidates: usize,
}

impl Default for BestBetsSettings {
    fn default() -> Self {
        Self {
            index: String::from("metasearch"),
            analyzer: String::from("best_bet_stemmed_match"),
            timeout_ms: 500,
            max_candidates: 1000,
        }
    }
}

/// Query construction settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Indices holding searchable content.
    pub content_indices: Vec<String>,
    /// Backend searched when none is named.
    pub default_backend: String,
    /// Bucket ceiling for facet aggregations.
    pub facet_size_ceiling: usize,
    /// Name of the popularity field.
    pub popularity_field: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            content_indices: DEFAULT_CONTENT_INDICES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            default_backend: String::from("primary"),
            facet_size_ceiling: 100_000,
            popularity_field: String::from("popularity"),
        }
    }
}

/// Relevance boost settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BoostSettings {
    /// Format name -> relevance multiplier.
    pub formats: BTreeMap<String, f64>,
}

impl Default for BoostSettings {
    fn default() -> Self {
        Self {
            formats: DEFAULT_FORMAT_WEIGHTS
                .iter()
                .map(|(format, weight)| ((*format).to_string(), *weight))
                .collect(),
        }
    }
}

/// An always-applied text filter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BaseFilter {
    /// Field name.
    pub field: String,
    /// Accepted values.
    pub values: Vec<String>,
    /// Negate the filter.
    #[serde(default)]
    pub reject: bool,
    /// Also accept documents lacking the field.
    #[serde(default)]
    pub include_missing: bool,
}

/// Indices searched when no configuration names them.
const DEFAULT_CONTENT_INDICES: &[&str] = &["mainstream", "detailed", "government"];

/// Format weights used when no configuration overrides them.
const DEFAULT_FORMAT_WEIGHTS: &[(&str, f64)] = &[
    ("smart-answer", 1.5),
    ("transaction", 1.5),
    ("topical_event", 1.5),
    ("minister", 1.7),
    ("organisation", 2.5),
    ("topic", 1.5),
    ("document_series", 1.3),
    ("document_collection", 1.3),
    ("operational_field", 1.5),
    ("contact", 0.3),
    ("service_manual_guide", 0.3),
    ("service_manual_topic", 0.3),
];

/// Backends used when no configuration defines any.
///
/// Every content index is its own backend, `primary` spans all of them, and the curated
/// overrides index is reachable by name.
pub fn default_backends() -> BTreeMap<String, Vec<String>> {
    let content: Vec<String> = DEFAULT_CONTENT_INDICES
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    let mut backends: BTreeMap<String, Vec<String>> = content
        .iter()
        .map(|index| (index.clone(), vec![index.clone()]))
        .collect();
    backends.insert(String::from("primary"), content);
    backends.insert(String::from("metasearch"), vec![String::from("metasearch")]);
    backends
}

/// Borrowed view of the settings for TOML serialization.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Engine connection.
    engine: &'a EngineSettings,
    /// Best bets lookup.
    best_bets: &'a BestBetsSettings,
    /// Query construction.
    search: &'a SearchSettings,
    /// Backend routing.
    backends: &'a BTreeMap<String, Vec<String>>,
    /// Relevance boosts.
    boost: &'a BoostSettings,
    /// Always-applied filters.
    #[serde(skip_serializing_if = "<[BaseFilter]>::is_empty")]
    base_filters: &'a [BaseFilter],
}

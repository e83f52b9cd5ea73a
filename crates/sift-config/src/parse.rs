//! Configuration file parsing.
//!
//! Parses individual `.sift.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
/// This mirrors the TOML schema exactly.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Index engine connection.
    pub engine: Option<RawEngineSettings>,
    /// Curated overrides lookup.
    pub best_bets: Option<RawBestBetsSettings>,
    /// Query construction settings.
    pub search: Option<RawSearchSettings>,
    /// Backend name -> one index name or a list of them.
    #[serde_as(as = "Option<BTreeMap<_, OneOrMany<_>>>")]
    pub backends: Option<BTreeMap<String, Vec<String>>>,
    /// Relevance boosts.
    pub boost: Option<RawBoostSettings>,
    /// Always-applied filters.
    pub base_filters: Option<Vec<RawBaseFilter>>,
}

/// Raw engine settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEngineSettings {
    /// Base URL of the index engine.
    pub url: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// Raw best bets settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBestBetsSettings {
    /// Name of the curated overrides index.
    pub index: Option<String>,
    /// Analyzer producing best bet keys.
    pub analyzer: Option<String>,
    /// Timeout for the lookup and analysis calls, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Upper bound on candidate entries fetched per query.
    pub max_candidates: Option<usize>,
}

/// Raw search settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Indices holding searchable content.
    pub content_indices: Option<Vec<String>>,
    /// Backend searched when none is named.
    pub default_backend: Option<String>,
    /// Bucket ceiling for facet aggregations.
    pub facet_size_ceiling: Option<usize>,
    /// Name of the popularity field.
    pub popularity_field: Option<String>,
}

/// Raw boost settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBoostSettings {
    /// Format name -> relevance multiplier.
    pub formats: Option<BTreeMap<String, f64>>,
}

/// Raw base filter from TOML.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct RawBaseFilter {
    /// Field name.
    pub field: String,
    /// Accepted value(s). Accepts either a single string or an array of strings.
    #[serde_as(as = "OneOrMany<_>")]
    pub values: Vec<String>,
    /// Negate the filter.
    pub reject: Option<bool>,
    /// Also accept documents lacking the field.
    pub include_missing: Option<bool>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context (tests only).
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}

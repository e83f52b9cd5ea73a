//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`, applying precedence
//! rules.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    BaseFilter, BestBetsSettings, BoostSettings, Config, EngineSettings, SearchSettings,
    default_backends,
    parse::{RawBaseFilter, RawBestBetsSettings, RawConfig, RawEngineSettings, RawSearchSettings},
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config).
///
/// Merge rules:
/// - Scalar settings: first defined value wins (highest precedence)
/// - Backends: merged by name, first definition wins; the built-in backends apply only when
///   no file defines any
/// - Format weights: merged by format over the built-in table, first definition wins
/// - Base filters: the highest-precedence file that defines the list wins wholesale
pub fn merge_configs(configs: &[ParsedConfig]) -> Config {
    if configs.is_empty() {
        return Config::default();
    }

    let mut engine = EngineSettings::default();
    let mut best_bets = BestBetsSettings::default();
    let mut search = SearchSettings::default();

    // Iterate in reverse (lowest precedence first) so higher precedence overwrites
    for parsed in configs.iter().rev() {
        let raw = &parsed.config;
        if let Some(ref v) = raw.engine {
            apply_raw_engine(&mut engine, v);
        }
        if let Some(ref v) = raw.best_bets {
            apply_raw_best_bets(&mut best_bets, v);
        }
        if let Some(ref v) = raw.search {
            apply_raw_search(&mut search, v);
        }
    }

    Config {
        engine,
        best_bets,
        search,
        backends: merge_backends(configs),
        boost: merge_boost(configs),
        base_filters: merge_base_filters(configs),
        config_root: configs
            .first()
            .and_then(|c| c.path.parent())
            .map(Path::to_path_buf),
    }
}

/// Applies raw engine settings to result, overwriting any present values.
fn apply_raw_engine(result: &mut EngineSettings, raw: &RawEngineSettings) {
    if let Some(ref v) = raw.url {
        result.url = v.clone();
    }
    if let Some(v) = raw.timeout_ms {
        result.timeout_ms = v;
    }
}

/// Applies raw best bets settings to result.
fn apply_raw_best_bets(result: &mut BestBetsSettings, raw: &RawBestBetsSettings) {
    if let Some(ref v) = raw.index {
        result.index = v.clone();
    }
    if let Some(ref v) = raw.analyzer {
        result.analyzer = v.clone();
    }
    if let Some(v) = raw.timeout_ms {
        result.timeout_ms = v;
    }
    if let Some(v) = raw.max_candidates {
        result.max_candidates = v;
    }
}

/// Applies raw search settings to result.
fn apply_raw_search(result: &mut SearchSettings, raw: &RawSearchSettings) {
    if let Some(ref v) = raw.content_indices {
        result.content_indices = v.clone();
    }
    if let Some(ref v) = raw.default_backend {
        result.default_backend = v.clone();
    }
    if let Some(v) = raw.facet_size_ceiling {
        result.facet_size_ceiling = v;
    }
    if let Some(ref v) = raw.popularity_field {
        result.popularity_field = v.clone();
    }
}

/// Merges backend tables by name.
fn merge_backends(configs: &[ParsedConfig]) -> BTreeMap<String, Vec<String>> {
    let mut backends: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut any_defined = false;

    // Precedence order (highest first) - first definition wins
    for parsed in configs {
        if let Some(ref defined) = parsed.config.backends {
            any_defined = true;
            for (name, indices) in defined {
                backends
                    .entry(name.clone())
                    .or_insert_with(|| indices.clone());
            }
        }
    }

    if any_defined {
        backends
    } else {
        default_backends()
    }
}

/// Merges format weights by name over the built-in table.
fn merge_boost(configs: &[ParsedConfig]) -> BoostSettings {
    let mut result = BoostSettings::default();
    for parsed in configs.iter().rev() {
        if let Some(formats) = parsed
            .config
            .boost
            .as_ref()
            .and_then(|b| b.formats.as_ref())
        {
            for (format, weight) in formats {
                result.formats.insert(format.clone(), *weight);
            }
        }
    }
    result
}

/// Takes the base filter list from the highest-precedence file that defines one.
fn merge_base_filters(configs: &[ParsedConfig]) -> Vec<BaseFilter> {
    configs
        .iter()
        .find_map(|parsed| parsed.config.base_filters.as_ref())
        .map(|filters| filters.iter().map(convert_base_filter).collect())
        .unwrap_or_default()
}

/// Converts a raw base filter to the resolved type.
fn convert_base_filter(raw: &RawBaseFilter) -> BaseFilter {
    BaseFilter {
        field: raw.field.clone(),
        values: raw.values.clone(),
        reject: raw.reject.unwrap_or(false),
        include_missing: raw.include_missing.unwrap_or(false),
    }
}

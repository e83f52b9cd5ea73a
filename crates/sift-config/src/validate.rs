//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use crate::Config;

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// A backend lists no indices.
    EmptyBackend {
        /// Name of the backend.
        backend: String,
    },
    /// A content index is not listed by any backend.
    UnroutedContentIndex {
        /// Name of the index.
        index: String,
    },
    /// The best bets index is not listed by any backend.
    UnroutedBestBetsIndex {
        /// Name of the index.
        index: String,
    },
    /// The default backend is not defined.
    UndefinedDefaultBackend {
        /// Name of the backend.
        backend: String,
    },
    /// The engine URL does not use http or https.
    EngineUrlNotHttp {
        /// The configured URL.
        url: String,
    },
    /// A format weight is zero or negative.
    NonPositiveFormatWeight {
        /// Format name.
        format: String,
        /// The configured weight.
        weight: f64,
    },
    /// A base filter has no values.
    EmptyBaseFilter {
        /// Filtered field.
        field: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBackend { backend } => {
                write!(f, "backend '{backend}' lists no indices")
            }
            Self::UnroutedContentIndex { index } => {
                write!(f, "content index '{index}' is not listed by any backend")
            }
            Self::UnroutedBestBetsIndex { index } => {
                write!(f, "best bets index '{index}' is not listed by any backend")
            }
            Self::UndefinedDefaultBackend { backend } => {
                write!(f, "default backend '{backend}' is not defined")
            }
            Self::EngineUrlNotHttp { url } => {
                write!(f, "engine url is not http(s): {url}")
            }
            Self::NonPositiveFormatWeight { format, weight } => {
                write!(f, "format '{format}' has a non-positive weight: {weight}")
            }
            Self::EmptyBaseFilter { field } => {
                write!(f, "base filter on '{field}' has no values")
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    for (backend, indices) in &config.backends {
        if indices.is_empty() {
            warnings.push(ConfigWarning::EmptyBackend {
                backend: backend.clone(),
            });
        }
    }

    let routed = config.physical_indices();
    for index in &config.search.content_indices {
        if !routed.contains(&index.as_str()) {
            warnings.push(ConfigWarning::UnroutedContentIndex {
                index: index.clone(),
            });
        }
    }
    if !routed.contains(&config.best_bets.index.as_str()) {
        warnings.push(ConfigWarning::UnroutedBestBetsIndex {
            index: config.best_bets.index.clone(),
        });
    }
    if !config.backends.contains_key(&config.search.default_backend) {
        warnings.push(ConfigWarning::UndefinedDefaultBackend {
            backend: config.search.default_backend.clone(),
        });
    }

    let url = &config.engine.url;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        warnings.push(ConfigWarning::EngineUrlNotHttp { url: url.clone() });
    }

    for (format, weight) in &config.boost.formats {
        if *weight <= 0.0 {
            warnings.push(ConfigWarning::NonPositiveFormatWeight {
                format: format.clone(),
                weight: *weight,
            });
        }
    }

    for filter in &config.base_filters {
        if filter.values.is_empty() {
            warnings.push(ConfigWarning::EmptyBaseFilter {
                field: filter.field.clone(),
            });
        }
    }

    warnings
}

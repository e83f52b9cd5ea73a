//! The curated-overrides index and the best-bet normalizer.

use std::time::Duration;

use serde_json::Value;
use sift_config::Config;
use sift_query::{BestBetsError, CuratedIndex};

use crate::{client::EngineClient, error::IndexError};

/// The index holding curated entries, reached with the best-bets timeout.
#[derive(Debug, Clone)]
pub struct MetasearchIndex {
    /// Client bounded by the best-bets timeout.
    client: EngineClient,
    /// Name of the curated-overrides index.
    index: String,
    /// Analyzer producing normalized keys.
    analyzer: String,
}

impl MetasearchIndex {
    /// Creates a handle on `index` using `analyzer` for normalization.
    pub fn new(client: EngineClient, index: &str, analyzer: &str) -> Self {
        Self {
            client,
            index: index.to_string(),
            analyzer: analyzer.to_string(),
        }
    }

    /// Creates a handle from the `[engine]` and `[best_bets]` settings.
    pub fn from_config(config: &Config) -> Result<Self, IndexError> {
        let client = EngineClient::new(
            &config.engine.url,
            Duration::from_millis(config.best_bets.timeout_ms),
        )?;
        Ok(Self::new(
            client,
            &config.best_bets.index,
            &config.best_bets.analyzer,
        ))
    }

    /// Converts free text into its normalized key: stemmed, lower-cased tokens joined by
    /// single spaces.
    pub fn normalize(&self, text: &str) -> Result<String, IndexError> {
        let tokens = self.client.analyze(&self.index, &self.analyzer, text)?;
        Ok(tokens
            .iter()
            .map(|token| token.to_lowercase())
            .collect::<Vec<_>>()
            .join(" "))
    }
}

impl CuratedIndex for MetasearchIndex {
    fn analyze(&self, text: &str) -> Result<String, BestBetsError> {
        Ok(self.normalize(text)?)
    }

    fn raw_search(&self, payload: &Value) -> Result<Vec<Value>, BestBetsError> {
        let response = self
            .client
            .post_json(&format!("{}/_search", self.index), payload)?;
        match response.pointer("/hits/hits") {
            Some(Value::Array(hits)) => Ok(hits.clone()),
            _ => Err(BestBetsError::MalformedResponse(
                "response has no hits.hits array".to_string(),
            )),
        }
    }
}

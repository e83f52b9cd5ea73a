//! Blocking JSON transport to the index engine.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sift_config::Config;
use tracing::debug;

use crate::error::IndexError;

/// A connection to the index engine with a fixed request timeout.
#[derive(Debug, Clone)]
pub struct EngineClient {
    /// Underlying HTTP client.
    http: Client,
    /// Engine base URL without a trailing slash.
    base_url: String,
    /// Timeout applied to every request.
    timeout: Duration,
}

/// Body of an analysis response.
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    /// Tokens in position order.
    tokens: Vec<AnalyzedToken>,
}

/// One token of an analysis response.
#[derive(Debug, Deserialize)]
struct AnalyzedToken {
    /// Token text.
    token: String,
}

impl EngineClient {
    /// Creates a client for the engine at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, IndexError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IndexError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Creates a client using the `[engine]` settings.
    pub fn from_config(config: &Config) -> Result<Self, IndexError> {
        Self::new(
            &config.engine.url,
            Duration::from_millis(config.engine.timeout_ms),
        )
    }

    /// Posts `body` as JSON to `path` and decodes the JSON answer.
    pub fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, IndexError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%url, "engine request");

        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| IndexError::transport(&e, timeout_ms))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| IndexError::transport(&e, timeout_ms))?;
        if !status.is_success() {
            return Err(IndexError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|e| IndexError::Decode(e.to_string()))
    }

    /// Runs `text` through `analyzer` on `index`, returning the tokens in order.
    pub fn analyze(
        &self,
        index: &str,
        analyzer: &str,
        text: &str,
    ) -> Result<Vec<String>, IndexError> {
        let body = json!({ "analyzer": analyzer, "text": text });
        let value = self.post_json(&format!("{index}/_analyze"), &body)?;
        let response: AnalyzeResponse =
            serde_json::from_value(value).map_err(|e| IndexError::Decode(e.to_string()))?;
        Ok(response.tokens.into_iter().map(|t| t.token).collect())
    }
}

//! Error types for query construction.

use thiserror::Error;

/// Errors surfaced by the query builder.
///
/// Expected best-bets degradation never reaches this type; only failures that indicate a
/// bug in the payloads this crate builds do.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The curated-overrides lookup failed in a way that must not be swallowed.
    #[error("best bets lookup failed: {0}")]
    BestBets(#[source] BestBetsError),
}

/// Failures of the curated-overrides lookup or the analysis call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BestBetsError {
    /// The engine did not answer within the configured timeout.
    #[error("timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The engine could not be reached, was overloaded or answered with a server error.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The curated-overrides index does not exist.
    #[error("curated index not found: {0}")]
    NotFound(String),

    /// The engine answered with a body this crate cannot read.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The engine rejected a request built by this crate.
    #[error("request rejected (status {status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },
}

impl BestBetsError {
    /// Returns true if the search should carry on without curated results.
    pub fn is_degradable(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// A curated entry fetched from storage lacks required data.
///
/// Only the offending entry is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed curated entry {id}: {reason}")]
pub struct MalformedCuratedEntry {
    /// Storage identifier of the entry (or `<unknown>`).
    pub id: String,
    /// What was missing or unreadable.
    pub reason: String,
}

impl MalformedCuratedEntry {
    /// Creates an error for the given entry.
    pub(crate) fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

//! Curated result overrides ("best bets").
//!
//! Editors attach promotions and demotions to a query string. At search time every stored
//! entry sharing at least one word with the user's query is fetched, then only entries that
//! really match are kept:
//!
//! - `exact` entries match when the user's query, lower-cased with whitespace collapsed,
//!   equals the entry's query.
//! - `stemmed` entries carry a normalized key (stemmed, lower-cased tokens joined by single
//!   spaces, padded with one space on each side). They match when that key is a substring
//!   of the equally padded normalized user query. Containment is one-way: a curated key
//!   longer than the query never matches it.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{BestBetsError, MalformedCuratedEntry};

/// Field holding the editorial details JSON.
const DETAILS_FIELD: &str = "details";

/// Field holding the precomputed normalized key.
pub const STEMMED_KEY_FIELD: &str = "stemmed_query_as_term";

/// Read access to the index holding curated entries.
///
/// Implementations perform network I/O and are expected to bound it with a timeout.
pub trait CuratedIndex {
    /// Normalizes `text` into a space-joined sequence of stemmed, lower-cased tokens.
    fn analyze(&self, text: &str) -> Result<String, BestBetsError>;

    /// Runs `payload` against the curated index, returning the raw hits.
    fn raw_search(&self, payload: &Value) -> Result<Vec<Value>, BestBetsError>;
}

/// How a curated entry is matched against queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    /// Whole-query equality after case and whitespace folding.
    Exact,
    /// Normalized key containment.
    Stemmed,
}

impl MatchType {
    /// Parses the wire name used in entry identifiers.
    fn parse(name: &str) -> Option<Self> {
        match name {
            "exact" => Some(Self::Exact),
            "stemmed" => Some(Self::Stemmed),
            _ => None,
        }
    }
}

/// A promoted document at an explicit rank position.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Promotion {
    /// Document identifier.
    pub link: String,
    /// Rank position; 1 is the top.
    pub position: u32,
}

impl Promotion {
    /// Creates a promotion.
    pub fn new(link: impl Into<String>, position: u32) -> Self {
        Self {
            link: link.into(),
            position,
        }
    }
}

/// A demoted document as stored in entry details.
#[derive(Debug, Clone, Deserialize)]
struct Demotion {
    /// Document identifier.
    link: String,
}

/// Editorial payload of an entry.
#[derive(Debug, Deserialize)]
struct Details {
    /// Promotions.
    #[serde(default)]
    best_bets: Vec<Promotion>,
    /// Demotions.
    #[serde(default)]
    worst_bets: Vec<Demotion>,
}

/// One stored curated entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuratedEntry {
    /// The query the entry was authored for.
    pub query: String,
    /// How it is matched.
    pub match_type: MatchType,
    /// Padded normalized key, present for stemmed entries.
    pub stemmed_key: Option<String>,
    /// Promoted documents.
    pub promotions: Vec<Promotion>,
    /// Demoted documents.
    pub demotions: Vec<String>,
}

impl CuratedEntry {
    /// Parses one search hit from the curated index.
    ///
    /// Hits are identified as `<query>-<match type>`; field values may be plain strings or
    /// single-element arrays.
    pub fn from_hit(hit: &Value) -> Result<Self, MalformedCuratedEntry> {
        let id = hit
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| MalformedCuratedEntry::new("<unknown>", "missing _id"))?;
        let (query, match_name) = id
            .rsplit_once('-')
            .ok_or_else(|| MalformedCuratedEntry::new(id, "identifier has no match type"))?;
        let match_type = MatchType::parse(match_name).ok_or_else(|| {
            MalformedCuratedEntry::new(id, format!("unknown match type '{match_name}'"))
        })?;

        let details_text = field_text(hit, DETAILS_FIELD)
            .ok_or_else(|| MalformedCuratedEntry::new(id, "missing details"))?;
        let details: Details = serde_json::from_str(details_text)
            .map_err(|e| MalformedCuratedEntry::new(id, format!("unreadable details: {e}")))?;

        let stemmed_key = match match_type {
            MatchType::Exact => None,
            MatchType::Stemmed => {
                let key = field_text(hit, STEMMED_KEY_FIELD)
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| MalformedCuratedEntry::new(id, "missing stemmed key"))?;
                Some(pad(key))
            }
        };

        Ok(Self {
            query: query.to_string(),
            match_type,
            stemmed_key,
            promotions: details.best_bets,
            demotions: details.worst_bets.into_iter().map(|d| d.link).collect(),
        })
    }

    /// Returns true if this entry applies to the user's query.
    ///
    /// `analyzed_query` is the normalized form of `raw_query`; it is only consulted for
    /// stemmed entries.
    pub fn matches(&self, raw_query: &str, analyzed_query: Option<&str>) -> bool {
        match self.match_type {
            MatchType::Exact => fold(raw_query) == fold(&self.query),
            MatchType::Stemmed => match (self.stemmed_key.as_deref(), analyzed_query) {
                (Some(key), Some(analyzed)) => pad(analyzed.trim()).contains(key),
                _ => false,
            },
        }
    }
}

/// Promotions and demotions accumulated from every matching entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CuratedOverrides {
    /// Promoted documents.
    pub promotions: Vec<Promotion>,
    /// Demoted documents.
    pub demotions: Vec<String>,
}

impl CuratedOverrides {
    /// Returns true if there is nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty() && self.demotions.is_empty()
    }

    /// Merges entries into one set of overrides.
    ///
    /// A link promoted several times keeps its best position. A demoted link is never
    /// promoted.
    pub fn from_entries<'e>(entries: impl IntoIterator<Item = &'e CuratedEntry>) -> Self {
        let mut best_positions: BTreeMap<&str, u32> = BTreeMap::new();
        let mut promotion_order: Vec<&str> = Vec::new();
        let mut demotions: Vec<String> = Vec::new();
        let mut demoted: HashSet<&str> = HashSet::new();

        for entry in entries {
            for promotion in &entry.promotions {
                best_positions
                    .entry(&promotion.link)
                    .and_modify(|p| *p = (*p).min(promotion.position))
                    .or_insert_with(|| {
                        promotion_order.push(&promotion.link);
                        promotion.position
                    });
            }
            for link in &entry.demotions {
                if demoted.insert(link) {
                    demotions.push(link.clone());
                }
            }
        }

        let promotions = promotion_order
            .into_iter()
            .filter(|link| !demoted.contains(link))
            .map(|link| Promotion::new(link, best_positions[link]))
            .collect();

        Self {
            promotions,
            demotions,
        }
    }

    /// Groups promoted links by position, lowest position first.
    pub fn promotion_groups(&self) -> Vec<(u32, Vec<String>)> {
        let mut groups: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for promotion in &self.promotions {
            groups
                .entry(promotion.position)
                .or_default()
                .push(promotion.link.clone());
        }
        groups.into_iter().collect()
    }
}

/// Fetches and matches curated entries for a query.
pub struct BestBetsResolver<'a> {
    /// Curated index access.
    index: &'a dyn CuratedIndex,
    /// Upper bound on candidate entries fetched per query.
    max_candidates: usize,
}

impl<'a> BestBetsResolver<'a> {
    /// Creates a resolver.
    pub fn new(index: &'a dyn CuratedIndex, max_candidates: usize) -> Self {
        Self {
            index,
            max_candidates,
        }
    }

    /// Broad pre-filter: any entry sharing a term with the query.
    pub fn lookup_payload(&self, query: &str) -> Value {
        json!({
            "query": {
                "bool": {
                    "should": [
                        { "match": { "exact_query": query } },
                        { "match": { "stemmed_query": query } },
                    ]
                }
            },
            "size": self.max_candidates,
            "fields": [DETAILS_FIELD, STEMMED_KEY_FIELD],
        })
    }

    /// Returns the overrides that apply to `query`.
    ///
    /// Malformed entries are skipped. The query is only analyzed when a stemmed candidate
    /// needs it.
    pub fn resolve(&self, query: &str) -> Result<CuratedOverrides, BestBetsError> {
        let hits = self.index.raw_search(&self.lookup_payload(query))?;
        let entries: Vec<CuratedEntry> = hits
            .iter()
            .filter_map(|hit| match CuratedEntry::from_hit(hit) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping curated entry");
                    None
                }
            })
            .collect();

        let analyzed = if entries.iter().any(|e| e.match_type == MatchType::Stemmed) {
            Some(self.index.analyze(query)?)
        } else {
            None
        };

        let matched: Vec<&CuratedEntry> = entries
            .iter()
            .filter(|entry| entry.matches(query, analyzed.as_deref()))
            .collect();
        debug!(
            candidates = entries.len(),
            matched = matched.len(),
            "resolved curated entries"
        );
        Ok(CuratedOverrides::from_entries(matched))
    }
}

/// Reads a stored field that may be a string or a single-element array.
fn field_text<'v>(hit: &'v Value, field: &str) -> Option<&'v str> {
    let value = hit.get("fields")?.get(field)?;
    match value {
        Value::String(s) => Some(s),
        Value::Array(items) => items.first()?.as_str(),
        _ => None,
    }
}

/// Lower-cases and collapses whitespace.
fn fold(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Surrounds a key with single spaces so containment lands on token boundaries.
pub fn pad(key: &str) -> String {
    format!(" {key} ")
}

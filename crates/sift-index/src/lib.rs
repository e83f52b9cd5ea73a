//! Index routing and engine transport for sift.
//!
//! This crate owns everything that touches the index engine:
//!
//! - [`Registry`] maps backend names to physical indices and resolves unions of them into a
//!   single [`MultiIndexTarget`]
//! - [`EngineClient`] is the blocking JSON transport with a bounded timeout
//! - [`MetasearchIndex`] is the curated-overrides index; it implements
//!   [`sift_query::CuratedIndex`] and provides the best-bet normalizer
//! - [`CuratedEntryPreparer`] fills the normalized key of curated entries at ingestion
//! - [`Searcher`] sends a query envelope to a resolved target

#![warn(missing_docs)]

mod client;
mod error;
mod metasearch;
mod prepare;
mod registry;
mod search;

pub use client::EngineClient;
pub use error::IndexError;
pub use metasearch::MetasearchIndex;
pub use prepare::CuratedEntryPreparer;
pub use registry::{IndexHandle, MultiIndexTarget, Registry};
pub use search::{SearchHit, SearchResponse, Searcher};

//! Index routing: backend names to physical index handles.
//!
//! A registry is built once from the configured backend table and never mutated, so it can
//! be shared across threads and looked up without locking.

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    hash::{Hash, Hasher},
};

use sift_config::Config;
use tracing::debug;

use crate::error::IndexError;

/// One physical index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexHandle {
    /// Index name as known to the engine.
    name: String,
}

impl IndexHandle {
    /// The index name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Several physical indices queried as one logical target.
///
/// Names keep the order they were resolved in. Two targets naming the same indices compare
/// equal whatever the order.
#[derive(Debug, Clone)]
pub struct MultiIndexTarget {
    /// Deduplicated handles in first-seen order.
    handles: Vec<IndexHandle>,
}

impl MultiIndexTarget {
    /// Index names in resolution order.
    pub fn index_names(&self) -> Vec<&str> {
        self.handles.iter().map(IndexHandle::name).collect()
    }

    /// Handles in resolution order.
    pub fn handles(&self) -> &[IndexHandle] {
        &self.handles
    }

    /// URL path segment addressing every index at once.
    pub fn path_segment(&self) -> String {
        self.index_names().join(",")
    }

    /// Names sorted, the identity used for routing.
    fn sorted_names(&self) -> Vec<&str> {
        let mut names = self.index_names();
        names.sort_unstable();
        names
    }
}

impl PartialEq for MultiIndexTarget {
    fn eq(&self, other: &Self) -> bool {
        self.sorted_names() == other.sorted_names()
    }
}

impl Eq for MultiIndexTarget {}

impl Hash for MultiIndexTarget {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted_names().hash(state);
    }
}

/// Read-only map from names to index handles.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Backend name -> member index names, in configured order.
    backends: BTreeMap<String, Vec<String>>,
    /// Every physical index named by any backend.
    indices: BTreeSet<String>,
}

impl Registry {
    /// Builds a registry from a backend table.
    pub fn new(backends: &BTreeMap<String, Vec<String>>) -> Self {
        let indices = backends.values().flatten().cloned().collect();
        Self {
            backends: backends.clone(),
            indices,
        }
    }

    /// Builds a registry from the `[backends]` section of a configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.backends)
    }

    /// Looks up a physical index by exact name.
    pub fn resolve(&self, name: &str) -> Result<IndexHandle, IndexError> {
        if self.indices.contains(name) {
            Ok(IndexHandle {
                name: name.to_string(),
            })
        } else {
            Err(IndexError::NoSuchIndex {
                name: name.to_string(),
            })
        }
    }

    /// Resolves backend or index names into one target.
    ///
    /// Backends expand to their members. Duplicates are dropped keeping the first
    /// occurrence. The first unknown name fails the whole call.
    pub fn resolve_multi<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<MultiIndexTarget, IndexError> {
        if names.is_empty() {
            return Err(IndexError::EmptyTarget);
        }

        let mut seen = HashSet::new();
        let mut handles = Vec::new();
        for name in names {
            for handle in self.expand(name.as_ref())? {
                if seen.insert(handle.name.clone()) {
                    handles.push(handle);
                }
            }
        }

        if handles.is_empty() {
            return Err(IndexError::EmptyTarget);
        }
        debug!(
            target_indices = %handles.iter().map(IndexHandle::name).collect::<Vec<_>>().join(","),
            "resolved search target"
        );
        Ok(MultiIndexTarget { handles })
    }

    /// Resolves a single backend (or index) name.
    pub fn resolve_backend(&self, name: &str) -> Result<MultiIndexTarget, IndexError> {
        self.resolve_multi(&[name])
    }

    /// Configured backends and their members, sorted by backend name.
    pub fn backends(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.backends
            .iter()
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    /// Handles for one name: a backend's members, or the index itself.
    fn expand(&self, name: &str) -> Result<Vec<IndexHandle>, IndexError> {
        match self.backends.get(name) {
            Some(members) => members.iter().map(|member| self.resolve(member)).collect(),
            None => self.resolve(name).map(|handle| vec![handle]),
        }
    }
}

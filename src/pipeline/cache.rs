//! Per-element memoization of the prepare stage.
//!
//! Entries are keyed by the element's explicit `id`, falling back to its
//! draw-list index, and guarded by the config fingerprint: a changed config
//! re-runs prepare, an unchanged one reuses the decoded resources. Entries
//! whose key disappears from the draw list are pruned after each draw.

use std::collections::{HashMap, HashSet};

use crate::assets::loader::PreparedImage;
use crate::config::model::ElementConfig;

/// Cache identity of an element across draws.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum CacheKey {
    /// Explicit `id`, stable under reordering.
    Id(String),
    /// Position in the draw list for anonymous elements.
    Index(usize),
}

/// Key for `elements[index]`.
pub(crate) fn cache_key(cfg: &ElementConfig, index: usize) -> CacheKey {
    match &cfg.id {
        Some(id) => CacheKey::Id(id.clone()),
        None => CacheKey::Index(index),
    }
}

/// Output of an element's prepare stage.
#[derive(Clone, Debug, Default)]
pub(crate) enum Prepared {
    /// Nothing to prepare (rect, line, text).
    #[default]
    None,
    /// Decoded bitmap for an image element.
    Image(PreparedImage),
}

#[derive(Clone, Debug)]
pub(crate) struct CacheEntry {
    pub fingerprint: u64,
    pub prepared: Prepared,
}

/// Fingerprint-guarded store of prepared element resources.
#[derive(Debug, Default)]
pub(crate) struct ElementCache {
    entries: HashMap<CacheKey, CacheEntry>,
}

impl ElementCache {
    /// The cached prepare output, only if the stored fingerprint matches.
    pub(crate) fn prepared_if_current(&self, key: &CacheKey, fingerprint: u64) -> Option<Prepared> {
        self.entries
            .get(key)
            .filter(|e| e.fingerprint == fingerprint)
            .map(|e| e.prepared.clone())
    }

    pub(crate) fn insert(&mut self, key: CacheKey, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    /// Drop entries for elements no longer in the draw list.
    pub(crate) fn prune(&mut self, live: &HashSet<CacheKey>) {
        self.entries.retain(|key, _| live.contains(key));
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/cache.rs"]
mod tests;

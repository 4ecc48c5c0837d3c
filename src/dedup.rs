//! Session-scoped post deduplication.
//!
//! Successive page loads re-render posts that were already extracted, so the
//! pipeline consults a set of seen status IDs before building a post. The set
//! lives for one scrape session and is never persisted.

use std::collections::HashSet;

/// Status IDs already extracted in the current session.
#[derive(Debug, Default, Clone)]
pub struct SeenIds {
    ids: HashSet<String>,
}

impl SeenIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an ID was already recorded.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Record an ID. Returns `false` if it was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

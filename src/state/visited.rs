use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// URLs already claimed during one crawl run
///
/// A URL is inserted exactly once, before its fetch and before any of its
/// children are scheduled, which is what makes cyclic link graphs terminate.
/// Serializable so batched runs can carry it between steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL for this run
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not visited before and is now claimed
    /// * `false` - The URL was already claimed
    pub fn insert(&mut self, url: &str) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

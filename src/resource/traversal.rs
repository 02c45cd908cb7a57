//! Descent bookkeeping shared by every node of one tree.

use std::collections::HashSet;
use std::sync::Mutex;

pub struct Traversal {
    visited: Mutex<HashSet<String>>,
    max_depth: usize,
    max_links: usize,
}

impl Traversal {
    pub fn new(max_depth: usize, max_links: usize) -> Self {
        Self {
            visited: Mutex::new(HashSet::new()),
            max_depth,
            max_links,
        }
    }

    /// Claim a URI for this tree. False if it was already claimed.
    pub fn admit(&self, uri: &str) -> bool {
        self.visited
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(uri.to_string())
    }

    /// Whether a node at `depth` may have children.
    pub fn can_descend(&self, depth: usize) -> bool {
        depth < self.max_depth
    }

    /// Claim up to `max_links` unvisited links, in order.
    pub fn select(&self, links: &[String]) -> Vec<String> {
        links
            .iter()
            .filter(|link| self.admit(link))
            .take(self.max_links)
            .cloned()
            .collect()
    }

    pub fn visited(&self) -> usize {
        self.visited.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

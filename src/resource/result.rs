//! Completed analysis trees.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::active_check::ActiveCheckResult;
use crate::fetch::FetchError;
use crate::message::Exchange;

/// One analysed resource: its exchange, the checks run against it, and
/// the resources reached by following its links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCheckResult {
    pub uri: String,
    pub exchange: Exchange,
    /// Completed active checks keyed by check name.
    #[serde(default)]
    pub checks: BTreeMap<String, ActiveCheckResult>,
    /// Child analyses keyed by normalized link URI.
    #[serde(default)]
    pub children: BTreeMap<String, ResourceCheckResult>,
    /// Links found in the body, in document order.
    #[serde(default)]
    pub links: Vec<String>,
}

impl ResourceCheckResult {
    pub fn new(exchange: Exchange) -> Self {
        Self {
            uri: exchange.request.uri.clone(),
            exchange,
            checks: BTreeMap::new(),
            children: BTreeMap::new(),
            links: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.exchange.response.is_complete()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.exchange.response.error.as_ref()
    }

    /// Every URI in the tree, depth first.
    pub fn uris(&self) -> Vec<&str> {
        let mut uris = vec![self.uri.as_str()];
        for child in self.children.values() {
            uris.extend(child.uris());
        }
        uris
    }
}

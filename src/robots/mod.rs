//! robots.txt advisory gate.
//!
//! # Responsibilities
//! - Decide whether a URI may be fetched, per the origin's robots.txt
//! - Cache parsed rules per origin for a configurable TTL
//!
//! # Design Decisions
//! - A robots.txt that can't be fetched, or isn't 2xx, allows everything
//! - Only the product token of the configured user agent is matched

pub mod rules;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use tokio::time::Instant;
use url::Url;

use crate::fetch::{FetchError, Fetcher, ResponseHead, ResponseSink};
use crate::message::ExchangeRequest;
use crate::observability::metrics;

pub use rules::RobotsRules;

/// Largest robots.txt body read.
const MAX_ROBOTS_BYTES: usize = 512 * 1024;

pub trait RobotsGate: Send + Sync {
    fn allowed<'a>(&'a self, uri: &'a Url) -> BoxFuture<'a, bool>;
}

#[derive(Default)]
struct CollectSink {
    status: u16,
    body: Vec<u8>,
}

impl ResponseSink for CollectSink {
    fn head(&mut self, head: ResponseHead) -> Result<(), FetchError> {
        self.status = head.status;
        Ok(())
    }

    fn body(&mut self, chunk: &[u8]) {
        let room = MAX_ROBOTS_BYTES.saturating_sub(self.body.len());
        self.body.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }
}

#[derive(Clone)]
struct CachedRules {
    rules: Arc<RobotsRules>,
    fetched_at: Instant,
}

/// Per-origin robots.txt cache shared across analyses.
pub struct RobotsCache {
    fetcher: Arc<dyn Fetcher>,
    product: String,
    ttl: Duration,
    entries: DashMap<String, CachedRules>,
}

impl RobotsCache {
    pub fn new(fetcher: Arc<dyn Fetcher>, user_agent: &str, ttl: Duration) -> Self {
        let product = user_agent
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        Self {
            fetcher,
            product,
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    async fn rules_for(&self, origin: &str) -> Arc<RobotsRules> {
        let cached = self
            .entries
            .get(origin)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.rules.clone());
        if let Some(rules) = cached {
            return rules;
        }

        let rules = Arc::new(self.fetch_rules(origin).await);
        self.entries.insert(
            origin.to_string(),
            CachedRules {
                rules: rules.clone(),
                fetched_at: Instant::now(),
            },
        );
        rules
    }

    async fn fetch_rules(&self, origin: &str) -> RobotsRules {
        let request = ExchangeRequest::get(format!("{}/robots.txt", origin));
        let mut sink = CollectSink::default();

        let started = Instant::now();
        let fetched = self.fetcher.fetch(&request, &mut sink).await;
        metrics::record_fetch_outcome(
            "robots",
            metrics::error_outcome(fetched.as_ref().err()),
            started.elapsed(),
        );

        match fetched {
            Ok(()) if (200..300).contains(&sink.status) => {
                tracing::debug!(origin = %origin, "robots.txt loaded");
                RobotsRules::parse(&String::from_utf8_lossy(&sink.body), &self.product)
            }
            Ok(()) => {
                tracing::debug!(origin = %origin, status = sink.status, "No usable robots.txt");
                RobotsRules::allow_all()
            }
            Err(e) => {
                tracing::debug!(origin = %origin, error = %e, "robots.txt fetch failed");
                RobotsRules::allow_all()
            }
        }
    }
}

impl RobotsGate for RobotsCache {
    fn allowed<'a>(&'a self, uri: &'a Url) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            if !matches!(uri.scheme(), "http" | "https") || uri.host_str().is_none() {
                return true;
            }
            let origin = uri.origin().ascii_serialization();
            let mut path = uri.path().to_string();
            if let Some(query) = uri.query() {
                path.push('?');
                path.push_str(query);
            }

            let rules = self.rules_for(&origin).await;
            rules.is_allowed(&path)
        })
    }
}

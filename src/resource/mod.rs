//! Resource fetch orchestration.
//!
//! # Data Flow
//! ```text
//! CheckRequest
//!     → Analyzer::check (one deadline, one visited set per tree)
//!     → robots gate                      (PolicyDenied on refusal)
//!     → Fetcher::fetch into MessageSink  (headers resolved on arrival)
//!     → on Complete, concurrently:
//!         - active checks, each a sub-fetch under the same deadline
//!         - link extraction and one child orchestration per new link
//!     → ResourceCheckResult
//! ```
//!
//! # Design Decisions
//! - Checks and children are joined inside the orchestration, never spawned
//! - Every await is bounded by the tree deadline; on expiry the branch is
//!   marked Failed(TIMEOUT) and the partial tree is returned
//! - Check notes land on the base response in check order after all finish

pub mod links;
pub mod result;
pub mod traversal;

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{join_all, BoxFuture};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::active_check::{ActiveCheck, ActiveCheckResult, CheckKind};
use crate::config::AnalyzerConfig;
use crate::fetch::{ExchangeObserver, FetchError, Fetcher, HttpFetcher, TracingObserver};
use crate::headers::HeaderRegistry;
use crate::message::{Exchange, ExchangeRequest, HttpMessage, MessageSink};
use crate::notes::NoteList;
use crate::observability::metrics;
use crate::robots::{RobotsCache, RobotsGate};

pub use result::ResourceCheckResult;
pub use traversal::Traversal;

/// What to analyse and how.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub uri: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub descend: bool,
    /// Restrict active checks to these; all of them when None.
    pub checks: Option<Vec<CheckKind>>,
}

impl CheckRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method: "GET".to_string(),
            headers: Vec::new(),
            descend: false,
            checks: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn descend(mut self, descend: bool) -> Self {
        self.descend = descend;
        self
    }

    pub fn only(mut self, checks: Vec<CheckKind>) -> Self {
        self.checks = Some(checks);
        self
    }
}

/// Per-tree state shared by every node.
struct Tree {
    deadline: Instant,
    traversal: Traversal,
    checks: Vec<CheckKind>,
    headers: Vec<(String, String)>,
}

pub struct Analyzer {
    config: Arc<AnalyzerConfig>,
    registry: Arc<HeaderRegistry>,
    fetcher: Arc<dyn Fetcher>,
    robots: Option<Arc<dyn RobotsGate>>,
    observer: Arc<dyn ExchangeObserver>,
}

impl Analyzer {
    /// Analyzer with the reqwest fetcher and, when enabled, a robots cache.
    pub fn new(config: AnalyzerConfig) -> Result<Self, FetchError> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.client)?);
        let robots: Option<Arc<dyn RobotsGate>> = if config.robots.enabled {
            Some(Arc::new(RobotsCache::new(
                fetcher.clone(),
                &config.client.user_agent,
                Duration::from_secs(config.robots.ttl_secs),
            )))
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(HeaderRegistry::standard()),
            fetcher,
            robots,
            observer: Arc::new(TracingObserver),
        })
    }

    /// Analyzer over any fetcher, without a robots gate.
    pub fn with_fetcher(config: AnalyzerConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(HeaderRegistry::standard()),
            fetcher,
            robots: None,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn robots(mut self, gate: Option<Arc<dyn RobotsGate>>) -> Self {
        self.robots = gate;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ExchangeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn registry(mut self, registry: Arc<HeaderRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyse one resource, and its links when asked to descend.
    pub async fn check(&self, request: CheckRequest) -> ResourceCheckResult {
        let limits = &self.config.limits;
        let deadline = Instant::now() + Duration::from_secs(limits.max_runtime_secs);
        let max_depth = if request.descend { limits.max_descend_depth } else { 0 };

        let mut checks = request.checks.unwrap_or_else(|| CheckKind::ALL.to_vec());
        checks.sort();
        checks.dedup();

        let uri = normalize_root(&request.uri);
        let tree = Tree {
            deadline,
            traversal: Traversal::new(max_depth, limits.max_links),
            checks,
            headers: request.headers,
        };
        tree.traversal.admit(&uri);

        info!(uri = %uri, descend = request.descend, "Check started");
        let root = ExchangeRequest {
            method: request.method,
            uri,
            headers: tree.headers.clone(),
        };
        let result = self.check_resource(root, &tree, 0).await;
        info!(
            uri = %result.uri,
            status = ?result.exchange.response.status,
            resources = tree.traversal.visited(),
            "Check finished"
        );
        result
    }

    fn check_resource<'a>(
        &'a self,
        request: ExchangeRequest,
        tree: &'a Tree,
        depth: usize,
    ) -> BoxFuture<'a, ResourceCheckResult> {
        Box::pin(async move {
            let kind = if depth == 0 { "primary" } else { "child" };
            let mut exchange = Exchange::new(request);

            if let Err(error) = self.robots_allow(&exchange.request.uri, tree.deadline).await {
                warn!(uri = %exchange.request.uri, error = %error, "Resource not fetched");
                if exchange.response.fail(error) {
                    self.observer.status_changed(&exchange.response);
                }
                metrics::record_fetch(kind, &exchange.response, Duration::ZERO);
                return ResourceCheckResult::new(exchange);
            }

            self.fetch(&exchange.request, &mut exchange.response, kind, tree.deadline)
                .await;
            let mut result = ResourceCheckResult::new(exchange);
            if !result.is_complete() {
                return result;
            }

            let base = &result.exchange;
            let (outcomes, (links, children)) = tokio::join!(
                self.run_checks(base, &tree.checks, tree.deadline),
                self.descend(base, tree, depth),
            );

            for (kind, notes, check) in outcomes {
                result.exchange.response.notes.append(notes);
                if let Some(check) = check {
                    result.checks.insert(kind.name().to_string(), check);
                }
            }
            metrics::record_notes(&result.exchange.response.notes);
            result.links = links;
            result.children = children.into_iter().collect();
            result
        })
    }

    async fn robots_allow(&self, uri: &str, deadline: Instant) -> Result<(), FetchError> {
        let Some(gate) = &self.robots else {
            return Ok(());
        };
        // Unparseable URIs fail in the fetcher instead.
        let Ok(url) = Url::parse(uri) else {
            return Ok(());
        };

        match timeout_at(deadline, gate.allowed(&url)).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(FetchError::PolicyDenied),
            Err(_) => Err(FetchError::Timeout),
        }
    }

    /// Fetch `request` into `response` under the deadline.
    async fn fetch(&self, request: &ExchangeRequest, response: &mut HttpMessage, kind: &str, deadline: Instant) {
        let started = Instant::now();
        let mut sink = MessageSink::new(
            response,
            &self.registry,
            self.observer.as_ref(),
            request.path(),
            self.config.limits.max_body_bytes,
        );

        debug!(uri = %request.uri, method = %request.method, kind = kind, "Fetch dispatched");
        match timeout_at(deadline, self.fetcher.fetch(request, &mut sink)).await {
            Ok(Ok(())) => sink.finish(),
            Ok(Err(error)) => sink.fail(error),
            Err(_) => sink.fail(FetchError::Timeout),
        }

        if let Some(error) = &response.error {
            warn!(uri = %request.uri, kind = kind, error = %error, "Fetch failed");
        }
        metrics::record_fetch(kind, response, started.elapsed());
    }

    /// Run the selected checks concurrently. Results come back in check order.
    async fn run_checks(
        &self,
        base: &Exchange,
        kinds: &[CheckKind],
        deadline: Instant,
    ) -> Vec<(CheckKind, NoteList, Option<ActiveCheckResult>)> {
        let checks: Vec<Box<dyn ActiveCheck + '_>> = kinds.iter().map(|kind| kind.bind(base)).collect();
        join_all(checks.iter().map(|check| self.run_check(check.as_ref(), deadline))).await
    }

    async fn run_check(
        &self,
        check: &dyn ActiveCheck,
        deadline: Instant,
    ) -> (CheckKind, NoteList, Option<ActiveCheckResult>) {
        let kind = check.kind();
        let mut notes = NoteList::new();
        if !check.preflight() {
            debug!(uri = %check.base().request.uri, check = kind.name(), "Check skipped");
            metrics::record_check(kind.name(), "skipped");
            return (kind, notes, None);
        }

        let request = check.sub_request();
        let mut response = HttpMessage::new(request.uri.clone());
        self.fetch(&request, &mut response, kind.name(), deadline).await;

        check.complete(&response, &mut notes);
        let outcome = if response.error.is_some() { "failed" } else { "ran" };
        metrics::record_check(kind.name(), outcome);
        debug!(
            uri = %request.uri,
            check = kind.name(),
            status = ?response.status,
            notes = notes.len(),
            "Check completed"
        );

        (kind, notes, Some(ActiveCheckResult { request, response }))
    }

    /// Extract links and analyse each unvisited one, if the depth budget
    /// allows. Returns every link found and the child results.
    async fn descend(
        &self,
        base: &Exchange,
        tree: &Tree,
        depth: usize,
    ) -> (Vec<String>, Vec<(String, ResourceCheckResult)>) {
        let response = &base.response;
        let is_html = response.content_type().is_some_and(|media| media.is_html());
        if !tree.traversal.can_descend(depth) || !is_html {
            return (Vec::new(), Vec::new());
        }
        let Some(body) = response.decoded() else {
            return (Vec::new(), Vec::new());
        };

        let extraction = links::extract_links(response.uri.clone(), body.to_vec());
        let Ok(links) = timeout_at(tree.deadline, extraction).await else {
            return (Vec::new(), Vec::new());
        };

        let selected = tree.traversal.select(&links);
        debug!(uri = %base.request.uri, found = links.len(), following = selected.len(), "Descending");

        let children = join_all(selected.into_iter().map(|link| async move {
            let request = ExchangeRequest {
                method: "GET".to_string(),
                uri: link.clone(),
                headers: tree.headers.clone(),
            };
            let child = self.check_resource(request, tree, depth + 1).await;
            (link, child)
        }))
        .await;

        (links, children)
    }
}

/// Parsed and fragment-free form of a root URI; unparseable input is kept
/// as given so the fetch reports it.
fn normalize_root(uri: &str) -> String {
    match Url::parse(uri.trim()) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => uri.to_string(),
    }
}

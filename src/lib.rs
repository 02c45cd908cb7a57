//! redcheck: an HTTP resource analyzer.
//!
//! Fetches a resource, resolves its headers into typed values, exercises
//! validator and range support with derived sub-requests, and optionally
//! follows links, recording every finding as a note on the exchange.

pub mod active_check;
pub mod config;
pub mod fetch;
pub mod headers;
pub mod message;
pub mod notes;
pub mod observability;
pub mod resource;
pub mod robots;
pub mod storage;

pub use active_check::CheckKind;
pub use config::schema::AnalyzerConfig;
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use resource::{Analyzer, CheckRequest, ResourceCheckResult};
pub use storage::SnapshotStore;

//! Network fetch primitive.
//!
//! # Data Flow
//! ```text
//! ExchangeRequest
//!     → Fetcher::fetch
//!         → ResponseSink::head(status line + headers)
//!         → ResponseSink::body(chunk) per chunk
//!     → Ok(()) once the body is exhausted, or FetchError
//! ```
//!
//! # Design Decisions
//! - Redirects are never followed; the analyzer reports on what the origin sent
//! - Bodies are never decompressed by the client; decoding is the sink's job
//! - Deadlines are applied by the caller around the whole fetch

pub mod error;
pub mod http;
#[cfg(test)]
pub(crate) mod mock;
pub mod observer;

use futures_util::future::BoxFuture;

use crate::message::ExchangeRequest;

pub use error::FetchError;
pub use http::HttpFetcher;
pub use observer::{ExchangeObserver, NoopObserver, TracingObserver};

/// Status line and headers of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    pub reason: String,
    pub version: String,
    pub headers: Vec<(String, String)>,
}

/// Consumer of a response as it streams in.
pub trait ResponseSink: Send {
    /// Called once, before any body chunk. An error aborts the fetch.
    fn head(&mut self, head: ResponseHead) -> Result<(), FetchError>;

    fn body(&mut self, chunk: &[u8]);
}

/// Issues one request and streams the response into a sink.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        request: &'a ExchangeRequest,
        sink: &'a mut dyn ResponseSink,
    ) -> BoxFuture<'a, Result<(), FetchError>>;
}

//! In-memory fetcher for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::fetch::{FetchError, Fetcher, ResponseHead, ResponseSink};
use crate::message::ExchangeRequest;

type Responder = Box<dyn Fn(&ExchangeRequest) -> MockResponse + Send + Sync>;

#[derive(Debug, Clone)]
pub(crate) struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub delay: Option<Duration>,
    pub error: Option<FetchError>,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            delay: None,
            error: None,
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    pub fn error(error: FetchError) -> Self {
        Self {
            error: Some(error),
            ..Self::new(0, Vec::new())
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Default)]
pub(crate) struct MockFetcher {
    routes: HashMap<String, Responder>,
    requests: Mutex<Vec<ExchangeRequest>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<F>(mut self, uri: &str, responder: F) -> Self
    where
        F: Fn(&ExchangeRequest) -> MockResponse + Send + Sync + 'static,
    {
        self.routes.insert(uri.to_string(), Box::new(responder));
        self
    }

    /// Requests seen so far, in issue order.
    pub fn requests(&self) -> Vec<ExchangeRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn requests_to(&self, uri: &str) -> Vec<ExchangeRequest> {
        self.requests().into_iter().filter(|r| r.uri == uri).collect()
    }
}

impl Fetcher for MockFetcher {
    fn fetch<'a>(
        &'a self,
        request: &'a ExchangeRequest,
        sink: &'a mut dyn ResponseSink,
    ) -> BoxFuture<'a, Result<(), FetchError>> {
        Box::pin(async move {
            self.requests
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(request.clone());

            let Some(responder) = self.routes.get(&request.uri) else {
                return Err(FetchError::Transport("connection refused".to_string()));
            };
            let response = responder(request);

            if let Some(delay) = response.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(error) = response.error {
                return Err(error);
            }

            sink.head(ResponseHead {
                status: response.status,
                reason: String::new(),
                version: "HTTP/1.1".to_string(),
                headers: response.headers,
            })?;

            // Two chunks, to exercise incremental hashing and decoding.
            let mid = response.body.len() / 2;
            let (first, second) = response.body.split_at(mid);
            for chunk in [first, second] {
                if !chunk.is_empty() {
                    sink.body(chunk);
                }
            }
            Ok(())
        })
    }
}

//! reqwest-backed fetcher.

use std::error::Error as _;
use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::redirect::Policy;

use crate::config::ClientConfig;
use crate::fetch::{FetchError, Fetcher, ResponseHead, ResponseSink};
use crate::message::ExchangeRequest;

pub struct HttpFetcher {
    client: reqwest::Client,
    accept_encoding: Option<String>,
}

impl HttpFetcher {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let accept_encoding = Some(config.accept_encoding.clone()).filter(|v| !v.is_empty());

        Ok(Self {
            client,
            accept_encoding,
        })
    }

    async fn fetch_inner(
        &self,
        request: &ExchangeRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<(), FetchError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| FetchError::Transport(format!("invalid method: {}", e)))?;
        let url = reqwest::Url::parse(&request.uri)
            .map_err(|e| FetchError::Transport(format!("invalid URI: {}", e)))?;

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(accept_encoding) = &self.accept_encoding {
            if request.header("accept-encoding").is_none() {
                builder = builder.header("accept-encoding", accept_encoding.as_str());
            }
        }

        tracing::debug!(method = %request.method, uri = %request.uri, "Sending request");
        let mut response = builder.send().await.map_err(classify)?;

        let status = response.status();
        let head = ResponseHead {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            version: format!("{:?}", response.version()),
            headers: response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect(),
        };
        sink.head(head)?;

        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            sink.body(&chunk);
        }

        Ok(())
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(
        &'a self,
        request: &'a ExchangeRequest,
        sink: &'a mut dyn ResponseSink,
    ) -> BoxFuture<'a, Result<(), FetchError>> {
        Box::pin(self.fetch_inner(request, sink))
    }
}

/// Map a client error onto the fetch taxonomy. Protocol violations surface
/// as hyper errors somewhere in the source chain.
fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout;
    }

    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(hyper_err) = inner.downcast_ref::<hyper::Error>() {
            if hyper_err.is_parse()
                || hyper_err.is_parse_status()
                || hyper_err.is_parse_too_large()
                || hyper_err.is_incomplete_message()
            {
                return FetchError::MalformedResponse(hyper_err.to_string());
            }
        }
        source = inner.source();
    }

    if err.is_decode() {
        return FetchError::MalformedResponse(err.to_string());
    }
    FetchError::Transport(err.to_string())
}

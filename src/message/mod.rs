//! HTTP exchange records.
//!
//! # Responsibilities
//! - Hold one response as it moves through the fetch state machine
//! - Keep raw and typed headers, body bytes, hash and notes together
//! - Enforce the single terminal error per message

pub mod sink;

use serde::{Deserialize, Serialize};

use crate::fetch::FetchError;
use crate::headers::{MediaType, ParsedHeaders};
use crate::notes::NoteList;

pub use sink::MessageSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchState {
    #[default]
    Created,
    Fetching,
    HeadersReceived,
    BodyReceiving,
    Complete,
    Failed,
}

impl FetchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, FetchState::Complete | FetchState::Failed)
    }
}

/// Outgoing request of an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub method: String,
    pub uri: String,
    pub headers: Vec<(String, String)>,
}

impl ExchangeRequest {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            headers: Vec::new(),
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new("GET", uri)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Path component of the URI, `/` when it can't be determined.
    pub fn path(&self) -> String {
        url::Url::parse(&self.uri)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| "/".to_string())
    }
}

/// One response, from creation to its terminal state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpMessage {
    pub uri: String,
    pub status: Option<u16>,
    pub reason: String,
    pub version: String,
    /// Raw header pairs, in wire order.
    pub headers: Vec<(String, String)>,
    pub parsed_headers: ParsedHeaders,
    /// Raw body bytes captured, up to the configured limit.
    #[serde(skip)]
    pub body: Vec<u8>,
    /// Decoded body, present when a content-coding was removed.
    #[serde(skip)]
    pub decoded_body: Option<Vec<u8>>,
    /// Total raw body length received, including uncaptured bytes.
    pub body_len: u64,
    pub truncated: bool,
    /// Hex SHA-256 of the complete raw body.
    pub content_hash: Option<String>,
    pub state: FetchState,
    pub error: Option<FetchError>,
    pub notes: NoteList,
}

impl HttpMessage {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    /// A message that was never fetched.
    pub fn failed(uri: impl Into<String>, error: FetchError) -> Self {
        let mut message = Self::new(uri);
        message.fail(error);
        message
    }

    /// Record the terminal error. Returns false if the message already
    /// reached a terminal state.
    pub fn fail(&mut self, error: FetchError) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.error = Some(error);
        self.state = FetchState::Failed;
        true
    }

    pub fn is_complete(&self) -> bool {
        self.state == FetchState::Complete && self.error.is_none()
    }

    /// First raw value of a header, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    pub fn content_type(&self) -> Option<&MediaType> {
        self.parsed_headers
            .get("content-type")
            .and_then(|v| v.as_media_type())
    }

    /// Content-codings in order of application, lowercased.
    pub fn content_codings(&self) -> Vec<&str> {
        self.parsed_headers
            .get("content-encoding")
            .and_then(|v| v.as_list())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.as_str())
                    .filter(|c| *c != "identity")
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Body with content-codings removed, if that was possible.
    pub fn decoded(&self) -> Option<&[u8]> {
        match &self.decoded_body {
            Some(decoded) => Some(decoded.as_slice()),
            None if self.content_codings().is_empty() => Some(self.body.as_slice()),
            None => None,
        }
    }
}

/// A request paired with its response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub request: ExchangeRequest,
    pub response: HttpMessage,
}

impl Exchange {
    pub fn new(request: ExchangeRequest) -> Self {
        let response = HttpMessage::new(request.uri.clone());
        Self { request, response }
    }
}

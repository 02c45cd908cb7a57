//! Streams a response into an `HttpMessage`.

use std::io::{self, Write};

use flate2::write::{GzDecoder, ZlibDecoder};
use sha2::{Digest, Sha256};

use crate::fetch::{ExchangeObserver, FetchError, ResponseHead, ResponseSink};
use crate::headers::HeaderRegistry;
use crate::message::{FetchState, HttpMessage};
use crate::notes::{NoteKind, Subject};

enum BodyDecoder {
    Gzip(GzDecoder<Vec<u8>>),
    Deflate(ZlibDecoder<Vec<u8>>),
}

impl BodyDecoder {
    fn for_coding(coding: &str) -> Option<Self> {
        match coding {
            "gzip" | "x-gzip" => Some(BodyDecoder::Gzip(GzDecoder::new(Vec::new()))),
            "deflate" => Some(BodyDecoder::Deflate(ZlibDecoder::new(Vec::new()))),
            _ => None,
        }
    }

    /// Feed a chunk and take whatever output it produced.
    fn write(&mut self, chunk: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            BodyDecoder::Gzip(d) => {
                d.write_all(chunk)?;
                Ok(std::mem::take(d.get_mut()))
            }
            BodyDecoder::Deflate(d) => {
                d.write_all(chunk)?;
                Ok(std::mem::take(d.get_mut()))
            }
        }
    }

    fn finish(&mut self) -> io::Result<Vec<u8>> {
        match self {
            BodyDecoder::Gzip(d) => {
                d.try_finish()?;
                Ok(std::mem::take(d.get_mut()))
            }
            BodyDecoder::Deflate(d) => {
                d.try_finish()?;
                Ok(std::mem::take(d.get_mut()))
            }
        }
    }
}

/// Fills one message from a fetch: resolves headers on arrival, hashes and
/// decodes the body per chunk, and reports transitions to the observer.
pub struct MessageSink<'a> {
    message: &'a mut HttpMessage,
    registry: &'a HeaderRegistry,
    observer: &'a dyn ExchangeObserver,
    base_path: String,
    max_body_bytes: usize,
    hasher: Sha256,
    decoder: Option<BodyDecoder>,
    coding: String,
}

impl<'a> MessageSink<'a> {
    pub fn new(
        message: &'a mut HttpMessage,
        registry: &'a HeaderRegistry,
        observer: &'a dyn ExchangeObserver,
        base_path: String,
        max_body_bytes: usize,
    ) -> Self {
        message.state = FetchState::Fetching;
        observer.status_changed(message);

        Self {
            message,
            registry,
            observer,
            base_path,
            max_body_bytes,
            hasher: Sha256::new(),
            decoder: None,
            coding: String::new(),
        }
    }

    fn transition(&mut self, state: FetchState) {
        if self.message.state != state {
            self.message.state = state;
            self.observer.status_changed(self.message);
        }
    }

    fn decode_failed(&mut self, err: io::Error) {
        let coding = std::mem::take(&mut self.coding);
        self.message.notes.add_note(
            Subject::Body,
            NoteKind::BadContentEncoding,
            &[("encoding", coding.as_str()), ("problem", err.to_string().as_str())],
        );
        self.decoder = None;
        self.message.decoded_body = None;
    }

    fn push_decoded(&mut self, bytes: Vec<u8>) {
        if let Some(decoded) = self.message.decoded_body.as_mut() {
            let room = self.max_body_bytes.saturating_sub(decoded.len());
            decoded.extend_from_slice(&bytes[..bytes.len().min(room)]);
        }
    }

    /// The fetch ended normally.
    pub fn finish(mut self) {
        if let Some(mut decoder) = self.decoder.take() {
            match decoder.finish() {
                Ok(rest) => self.push_decoded(rest),
                Err(err) => self.decode_failed(err),
            }
        }
        let hash = std::mem::take(&mut self.hasher).finalize();
        self.message.content_hash = Some(hex::encode(hash));
        self.transition(FetchState::Complete);
    }

    /// The fetch ended with an error; the first error recorded wins.
    pub fn fail(self, error: FetchError) {
        if self.message.fail(error) {
            self.observer.status_changed(self.message);
        }
    }
}

impl ResponseSink for MessageSink<'_> {
    fn head(&mut self, head: ResponseHead) -> Result<(), FetchError> {
        if !(100..=599).contains(&head.status) {
            return Err(FetchError::MalformedResponse(format!(
                "status code {} out of range",
                head.status
            )));
        }

        self.message.status = Some(head.status);
        self.message.reason = head.reason;
        self.message.version = head.version;
        self.message.parsed_headers =
            self.registry
                .resolve(&head.headers, &self.base_path, &mut self.message.notes);
        self.message.headers = head.headers;

        let codings = self.message.content_codings();
        if let [coding] = codings.as_slice() {
            self.decoder = BodyDecoder::for_coding(coding);
            if self.decoder.is_some() {
                self.coding = coding.to_string();
                self.message.decoded_body = Some(Vec::new());
            }
        }

        self.transition(FetchState::HeadersReceived);
        Ok(())
    }

    fn body(&mut self, chunk: &[u8]) {
        self.transition(FetchState::BodyReceiving);
        self.observer.body_chunk(&self.message.uri, chunk);

        self.hasher.update(chunk);
        self.message.body_len += chunk.len() as u64;

        let room = self.max_body_bytes.saturating_sub(self.message.body.len());
        if chunk.len() > room && !self.message.truncated {
            self.message.truncated = true;
            let limit = self.max_body_bytes.to_string();
            self.message
                .notes
                .add_note(Subject::Body, NoteKind::BodyTruncated, &[("limit", limit.as_str())]);
        }
        self.message
            .body
            .extend_from_slice(&chunk[..chunk.len().min(room)]);

        if let Some(decoder) = self.decoder.as_mut() {
            match decoder.write(chunk) {
                Ok(bytes) => self.push_decoded(bytes),
                Err(err) => self.decode_failed(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::NoopObserver;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn head(status: u16, headers: &[(&str, &str)]) -> ResponseHead {
        ResponseHead {
            status,
            reason: String::new(),
            version: "HTTP/1.1".to_string(),
            headers: headers
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_hash_and_state() {
        let registry = HeaderRegistry::standard();
        let mut message = HttpMessage::new("http://example.com/");
        let mut sink = MessageSink::new(&mut message, &registry, &NoopObserver, "/".into(), 1024);
        sink.head(head(200, &[("Content-Length", "5")])).unwrap();
        sink.body(b"he");
        sink.body(b"llo");
        sink.finish();

        assert_eq!(message.state, FetchState::Complete);
        assert_eq!(message.body, b"hello");
        assert_eq!(
            message.content_hash.as_deref(),
            Some("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
        );
        assert!(message.parsed_headers.contains("content-length"));
    }

    #[test]
    fn test_gzip_decoded_incrementally() {
        let registry = HeaderRegistry::standard();
        let compressed = gzip(b"<html>decoded</html>");
        let mut message = HttpMessage::new("http://example.com/");
        let mut sink = MessageSink::new(&mut message, &registry, &NoopObserver, "/".into(), 1024);
        sink.head(head(200, &[("Content-Encoding", "gzip")])).unwrap();
        for chunk in compressed.chunks(4) {
            sink.body(chunk);
        }
        sink.finish();

        assert_eq!(message.decoded(), Some(&b"<html>decoded</html>"[..]));
        assert!(message.notes.is_empty());
    }

    #[test]
    fn test_bad_gzip_noted_not_failed() {
        let registry = HeaderRegistry::standard();
        let mut message = HttpMessage::new("http://example.com/");
        let mut sink = MessageSink::new(&mut message, &registry, &NoopObserver, "/".into(), 1024);
        sink.head(head(200, &[("Content-Encoding", "gzip")])).unwrap();
        sink.body(b"definitely not gzip data");
        sink.finish();

        assert!(message.is_complete());
        assert_eq!(message.notes.kinds(), vec![NoteKind::BadContentEncoding]);
        assert_eq!(message.decoded(), None);
    }

    #[test]
    fn test_body_limit_keeps_hashing() {
        let registry = HeaderRegistry::standard();
        let mut message = HttpMessage::new("http://example.com/");
        let mut sink = MessageSink::new(&mut message, &registry, &NoopObserver, "/".into(), 4);
        sink.head(head(200, &[])).unwrap();
        sink.body(b"hel");
        sink.body(b"lo");
        sink.finish();

        assert_eq!(message.body, b"hell");
        assert_eq!(message.body_len, 5);
        assert!(message.truncated);
        assert_eq!(message.notes.count(NoteKind::BodyTruncated), 1);
        assert_eq!(
            message.content_hash.as_deref(),
            Some("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
        );
    }

    #[test]
    fn test_out_of_range_status_rejected() {
        let registry = HeaderRegistry::standard();
        let mut message = HttpMessage::new("http://example.com/");
        let mut sink = MessageSink::new(&mut message, &registry, &NoopObserver, "/".into(), 1024);
        let err = sink.head(head(999, &[])).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
        sink.fail(err);

        assert_eq!(message.state, FetchState::Failed);
        assert!(message.status.is_none());
    }
}

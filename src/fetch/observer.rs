//! Progress callbacks for a presentation layer.

use crate::message::HttpMessage;

/// Receives exchange progress. Calls arrive on the orchestration task, so
/// implementations must return quickly.
pub trait ExchangeObserver: Send + Sync {
    /// Called on every state transition of a message.
    fn status_changed(&self, _message: &HttpMessage) {}

    /// Called with each raw body chunk as it arrives.
    fn body_chunk(&self, _uri: &str, _chunk: &[u8]) {}
}

pub struct NoopObserver;

impl ExchangeObserver for NoopObserver {}

/// Logs transitions through `tracing`.
pub struct TracingObserver;

impl ExchangeObserver for TracingObserver {
    fn status_changed(&self, message: &HttpMessage) {
        tracing::debug!(
            uri = %message.uri,
            state = ?message.state,
            status = ?message.status,
            "Exchange state changed"
        );
    }

    fn body_chunk(&self, uri: &str, chunk: &[u8]) {
        tracing::trace!(uri = %uri, bytes = chunk.len(), "Body chunk received");
    }
}

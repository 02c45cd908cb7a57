//! Terminal fetch failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchError {
    /// Connection, TLS or I/O failure, or a request that couldn't be built.
    #[serde(rename = "TRANSPORT_ERROR")]
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("timed out before the response completed")]
    Timeout,

    /// Not fetched because robots.txt disallows it.
    #[error("disallowed by robots.txt")]
    PolicyDenied,
}

impl FetchError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::MalformedResponse(_) => "malformed",
            FetchError::Timeout => "timeout",
            FetchError::PolicyDenied => "policy_denied",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_taxonomy() {
        let json = serde_json::to_string(&FetchError::Transport("refused".into())).unwrap();
        assert_eq!(json, r#"{"kind":"TRANSPORT_ERROR","detail":"refused"}"#);

        let json = serde_json::to_string(&FetchError::Timeout).unwrap();
        assert_eq!(json, r#"{"kind":"TIMEOUT"}"#);

        let back: FetchError = serde_json::from_str(r#"{"kind":"POLICY_DENIED"}"#).unwrap();
        assert_eq!(back, FetchError::PolicyDenied);
    }
}

//! Content-Type: a single media type with parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::headers::handler::{HeaderContext, HeaderHandler, ParseError};
use crate::headers::syntax;
use crate::headers::value::FieldValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaType {
    /// `type/subtype`, lowercased.
    pub essence: String,
    /// Parameter names lowercased, values unquoted.
    pub params: BTreeMap<String, String>,
}

impl MediaType {
    pub fn parse(value: &str) -> Option<Self> {
        if syntax::trim_ows(value).starts_with(';') {
            return None;
        }
        let mut parts = syntax::split_outside_quotes(value, ';').into_iter();
        let essence = parts.next()?;
        let (kind, subtype) = essence.split_once('/')?;
        if !syntax::is_token(kind) || !syntax::is_token(subtype) {
            return None;
        }

        let mut params = BTreeMap::new();
        for param in parts {
            let (name, val) = param.split_once('=')?;
            if !syntax::is_token(name) {
                return None;
            }
            let val = if syntax::is_token(val) {
                val.to_string()
            } else if syntax::is_quoted_string(val) {
                syntax::unquote(val)
            } else {
                return None;
            };
            params.insert(name.to_ascii_lowercase(), val);
        }

        Some(Self {
            essence: essence.to_ascii_lowercase(),
            params,
        })
    }

    pub fn is_html(&self) -> bool {
        self.essence == "text/html" || self.essence == "application/xhtml+xml"
    }
}

pub fn handler() -> HeaderHandler {
    HeaderHandler::new("Content-Type", parse).single()
}

fn parse(value: &str, _cx: &mut HeaderContext<'_>) -> Result<FieldValue, ParseError> {
    MediaType::parse(value)
        .map(FieldValue::MediaType)
        .ok_or(ParseError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_with_params() {
        let mt = MediaType::parse(r#"Text/HTML; charset="utf-8""#).unwrap();
        assert_eq!(mt.essence, "text/html");
        assert_eq!(mt.params.get("charset").map(String::as_str), Some("utf-8"));
        assert!(mt.is_html());
    }

    #[test]
    fn test_quoted_param_may_contain_semicolon() {
        let mt = MediaType::parse(r#"text/plain; charset="a;b"; format=flowed"#).unwrap();
        assert_eq!(mt.params.get("charset").map(String::as_str), Some("a;b"));
        assert_eq!(mt.params.get("format").map(String::as_str), Some("flowed"));
    }

    #[test]
    fn test_media_type_rejects_garbage() {
        assert!(MediaType::parse("html").is_none());
        assert!(MediaType::parse("text/html; charset").is_none());
        assert!(MediaType::parse("text/html; a=b c").is_none());
    }
}

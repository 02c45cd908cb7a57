//! ETag: a single entity tag, weak or strong.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::headers::handler::{HeaderContext, HeaderHandler, ParseError};
use crate::headers::syntax;
use crate::headers::value::FieldValue;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityTag {
    pub weak: bool,
    /// Opaque tag without quotes.
    pub tag: String,
}

impl EntityTag {
    pub fn parse(value: &str) -> Option<Self> {
        if !syntax::is_entity_tag(value) {
            return None;
        }
        let (weak, opaque) = match value.strip_prefix("W/") {
            Some(rest) => (true, rest),
            None => (false, value),
        };
        Some(Self {
            weak,
            tag: opaque[1..opaque.len() - 1].to_string(),
        })
    }
}

/// Wire form, suitable for If-None-Match.
impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            write!(f, "W/\"{}\"", self.tag)
        } else {
            write!(f, "\"{}\"", self.tag)
        }
    }
}

pub fn handler() -> HeaderHandler {
    HeaderHandler::new("ETag", parse)
        .single()
        .with_syntax(syntax::is_entity_tag)
}

fn parse(value: &str, _cx: &mut HeaderContext<'_>) -> Result<FieldValue, ParseError> {
    EntityTag::parse(value)
        .map(FieldValue::EntityTag)
        .ok_or(ParseError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak_prefix_survives_round_trip() {
        let tag = EntityTag::parse(r#"W/"v1""#).unwrap();
        assert!(tag.weak);
        assert_eq!(tag.tag, "v1");
        assert_eq!(tag.to_string(), r#"W/"v1""#);

        let strong = EntityTag::parse(r#""v1""#).unwrap();
        assert!(!strong.weak);
        assert_eq!(strong.to_string(), r#""v1""#);
    }

    #[test]
    fn test_unquoted_tag_rejected() {
        assert!(EntityTag::parse("v1").is_none());
    }
}

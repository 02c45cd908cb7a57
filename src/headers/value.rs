//! Typed header values.

use std::collections::BTreeMap;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::headers::content_type::MediaType;
use crate::headers::etag::EntityTag;
use crate::headers::set_cookie::SetCookie;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum FieldValue {
    Integer(BigUint),
    /// Lowercased token.
    Token(String),
    Text(String),
    EntityTag(EntityTag),
    /// Seconds since the epoch.
    Date(i64),
    MediaType(MediaType),
    Cookie(SetCookie),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn as_integer(&self) -> Option<&BigUint> {
        match self {
            FieldValue::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Token(s) | FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_entity_tag(&self) -> Option<&EntityTag> {
        match self {
            FieldValue::EntityTag(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<i64> {
        match self {
            FieldValue::Date(secs) => Some(*secs),
            _ => None,
        }
    }

    pub fn as_media_type(&self) -> Option<&MediaType> {
        match self {
            FieldValue::MediaType(mt) => Some(mt),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether a list value contains the given token.
    pub fn has_token(&self, token: &str) -> bool {
        self.as_list()
            .map(|items| items.iter().any(|i| i.as_str() == Some(token)))
            .unwrap_or(false)
    }
}

/// Mapping from lowercase header name to parsed value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedHeaders(BTreeMap<String, FieldValue>);

impl ParsedHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: FieldValue) {
        self.0.insert(name.to_ascii_lowercase(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(&name.to_ascii_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

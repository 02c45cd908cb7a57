//! Header registry and resolution.

use std::collections::HashMap;

use crate::headers::handler::{Cardinality, HeaderContext, HeaderHandler, Joined, ParseError};
use crate::headers::syntax::trim_ows;
use crate::headers::value::{FieldValue, ParsedHeaders};
use crate::headers::{
    content_length, content_type, etag, last_modified, lists, set_cookie, x_frame_options,
};
use crate::notes::{NoteKind, NoteList};

/// Name → handler table, populated once and shared read-only.
#[derive(Debug, Clone)]
pub struct HeaderRegistry {
    handlers: Vec<HeaderHandler>,
    index: HashMap<String, usize>,
    generic: HeaderHandler,
}

impl Default for HeaderRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl HeaderRegistry {
    /// A registry with no handlers; every header goes through the generic one.
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
            index: HashMap::new(),
            generic: HeaderHandler::generic(),
        }
    }

    /// A registry with every built-in handler.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(content_length::handler());
        registry.register(content_type::handler());
        registry.register(lists::content_encoding());
        registry.register(etag::handler());
        registry.register(last_modified::handler());
        registry.register(lists::accept_ranges());
        registry.register(set_cookie::handler());
        registry.register(x_frame_options::handler());
        registry
    }

    /// Bind a handler to its (case-insensitive) name, replacing any
    /// earlier binding in place.
    pub fn register(&mut self, handler: HeaderHandler) {
        let key = handler.name.to_ascii_lowercase();
        match self.index.get(&key) {
            Some(&pos) => self.handlers[pos] = handler,
            None => {
                self.index.insert(key, self.handlers.len());
                self.handlers.push(handler);
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&HeaderHandler> {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|&pos| &self.handlers[pos])
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Turn raw header pairs into the typed mapping, recording notes.
    ///
    /// Registered headers resolve in registration order, then the rest in
    /// name order. Only headers that parse successfully appear in the result.
    pub fn resolve(
        &self,
        headers: &[(String, String)],
        base_path: &str,
        notes: &mut NoteList,
    ) -> ParsedHeaders {
        // lowercase name → (first-seen spelling, occurrences)
        let mut grouped: HashMap<String, (&str, Vec<&str>)> = HashMap::new();
        for (name, value) in headers {
            grouped
                .entry(name.to_ascii_lowercase())
                .or_insert_with(|| (name.as_str(), Vec::new()))
                .1
                .push(value.as_str());
        }

        let mut order: Vec<(&HeaderHandler, String)> = self
            .handlers
            .iter()
            .filter(|h| grouped.contains_key(&h.name.to_ascii_lowercase()))
            .map(|h| (h, h.name.to_ascii_lowercase()))
            .collect();
        let mut unregistered: Vec<String> = grouped
            .keys()
            .filter(|k| !self.index.contains_key(*k))
            .cloned()
            .collect();
        unregistered.sort();
        order.extend(unregistered.into_iter().map(|k| (&self.generic, k)));

        let mut parsed = ParsedHeaders::new();
        for (handler, key) in order {
            let Some((spelling, occurrences)) = grouped.remove(&key) else {
                continue;
            };
            let field_name = if self.index.contains_key(&key) {
                handler.name
            } else {
                spelling
            };
            if let Some(value) = resolve_one(handler, field_name, &occurrences, base_path, notes) {
                parsed.insert(&key, value);
            }
        }
        parsed
    }
}

fn resolve_one(
    handler: &HeaderHandler,
    field_name: &str,
    occurrences: &[&str],
    base_path: &str,
    notes: &mut NoteList,
) -> Option<FieldValue> {
    let mut cx = HeaderContext::new(field_name, base_path, notes);

    let mut surviving = Vec::with_capacity(occurrences.len());
    for raw in occurrences {
        let value = trim_ows(raw);
        if (handler.syntax)(value) {
            surviving.push(value.to_string());
        } else {
            cx.note(handler.syntax_note, &[("field_name", field_name)]);
        }
    }
    if surviving.is_empty() {
        return None;
    }

    if handler.cardinality == Cardinality::Single && surviving.len() > 1 {
        cx.note(NoteKind::SingleHeaderRepeat, &[("field_name", field_name)]);
        surviving.truncate(1);
    }

    match (handler.join)(surviving, &mut cx) {
        Joined::One(value) => parse_value(handler, &value, &mut cx),
        Joined::Many(values) => {
            let items: Vec<FieldValue> = values
                .iter()
                .filter_map(|v| parse_value(handler, v, &mut cx))
                .collect();
            if items.is_empty() {
                None
            } else {
                Some(FieldValue::List(items))
            }
        }
    }
}

fn parse_value(handler: &HeaderHandler, value: &str, cx: &mut HeaderContext<'_>) -> Option<FieldValue> {
    match (handler.parse)(value, cx) {
        Ok(parsed) => Some(parsed),
        Err(ParseError::Invalid) => {
            let field_name = cx.field_name;
            cx.note(NoteKind::BadSyntax, &[("field_name", field_name)]);
            None
        }
        Err(ParseError::Reported) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::Subject;
    use num_bigint::BigUint;

    fn resolve(headers: &[(&str, &str)]) -> (ParsedHeaders, NoteList) {
        let registry = HeaderRegistry::standard();
        let headers: Vec<(String, String)> = headers
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        let mut notes = NoteList::new();
        let parsed = registry.resolve(&headers, "/", &mut notes);
        (parsed, notes)
    }

    #[test]
    fn test_content_length_values() {
        let (parsed, notes) = resolve(&[("Content-Length", "1")]);
        assert_eq!(parsed.get("content-length").and_then(|v| v.as_integer()), Some(&BigUint::from(1u32)));
        assert!(notes.is_empty());

        let (parsed, notes) = resolve(&[("Content-Length", " 1 ")]);
        assert_eq!(parsed.get("content-length").and_then(|v| v.as_integer()), Some(&BigUint::from(1u32)));
        assert!(notes.is_empty());
    }

    #[test]
    fn test_content_length_rejects_non_digits() {
        for raw in ["a", "1;", "-1", "+1", "1 2"] {
            let (parsed, notes) = resolve(&[("Content-Length", raw)]);
            assert!(parsed.get("content-length").is_none(), "{raw:?} should be rejected");
            assert_eq!(notes.kinds(), vec![NoteKind::BadSyntax], "{raw:?}");
        }
    }

    #[test]
    fn test_content_length_big() {
        let digits = "9".repeat(999);
        let (parsed, notes) = resolve(&[("Content-Length", digits.as_str())]);
        let expected = BigUint::parse_bytes(digits.as_bytes(), 10).unwrap();
        assert_eq!(parsed.get("content-length").and_then(|v| v.as_integer()), Some(&expected));
        assert!(notes.is_empty());
    }

    #[test]
    fn test_single_header_repeat_keeps_first() {
        let (parsed, notes) = resolve(&[("Content-Length", "10"), ("content-length", "20")]);
        assert_eq!(parsed.get("content-length").and_then(|v| v.as_integer()), Some(&BigUint::from(10u32)));
        assert_eq!(notes.kinds(), vec![NoteKind::SingleHeaderRepeat]);
    }

    #[test]
    fn test_bad_occurrence_dropped_before_repeat_check() {
        let (parsed, notes) = resolve(&[("Content-Length", "x"), ("Content-Length", "5")]);
        assert_eq!(parsed.get("content-length").and_then(|v| v.as_integer()), Some(&BigUint::from(5u32)));
        assert_eq!(notes.kinds(), vec![NoteKind::BadSyntax]);
    }

    #[test]
    fn test_x_frame_options_deny_any_case() {
        for raw in ["deny", "DENY", "Deny"] {
            let (parsed, notes) = resolve(&[("X-Frame-Options", raw)]);
            let subject = Subject::header("x-frame-options");
            let kinds: Vec<NoteKind> = notes.notes_for(&subject).map(|n| n.kind).collect();
            assert_eq!(kinds, vec![NoteKind::FrameOptionsDeny]);
            assert!(parsed.get("x-frame-options").unwrap().has_token("deny"));
        }
    }

    #[test]
    fn test_x_frame_options_other_values() {
        let (_, notes) = resolve(&[("X-Frame-Options", "sameorigin")]);
        assert_eq!(notes.kinds(), vec![NoteKind::FrameOptionsSameorigin]);

        let (parsed, notes) = resolve(&[("X-Frame-Options", "foO")]);
        assert_eq!(notes.kinds(), vec![NoteKind::FrameOptionsUnknown]);
        assert!(parsed.get("x-frame-options").unwrap().has_token("foo"));
    }

    #[test]
    fn test_x_frame_options_allow_from_noted_once() {
        let (parsed, notes) = resolve(&[("X-Frame-Options", "ALLOW-FROM https://example.com/")]);
        assert_eq!(notes.kinds(), vec![NoteKind::FrameOptionsUnknown]);
        assert!(parsed
            .get("x-frame-options")
            .unwrap()
            .has_token("allow-from https://example.com/"));
    }

    #[test]
    fn test_generic_header_not_checked() {
        let (parsed, notes) = resolve(&[("X-Custom", "fine value"), ("X-Bad", "bell\x07")]);
        assert_eq!(parsed.get("x-custom").and_then(|v| v.as_str()), Some("fine value"));
        assert!(parsed.get("x-bad").is_none());
        assert_eq!(notes.kinds(), vec![NoteKind::HeaderNotChecked]);
        assert_eq!(notes.iter().next().unwrap().subject, Subject::header("x-bad"));
    }

    #[test]
    fn test_generic_repeat_last_wins() {
        let (parsed, notes) = resolve(&[("X-Thing", "one"), ("X-Thing", "two")]);
        assert_eq!(parsed.get("x-thing").and_then(|v| v.as_str()), Some("two"));
        assert!(notes.is_empty());
    }

    #[test]
    fn test_resolution_order() {
        let (_, notes) = resolve(&[
            ("Zeta", "\x01"),
            ("Alpha", "\x01"),
            ("X-Frame-Options", "deny"),
            ("Content-Length", "x"),
        ]);
        let subjects: Vec<String> = notes.iter().map(|n| n.subject.to_string()).collect();
        assert_eq!(
            subjects,
            vec![
                "header-content-length",
                "header-x-frame-options",
                "header-alpha",
                "header-zeta"
            ]
        );
    }

    #[test]
    fn test_list_headers_flatten() {
        let (parsed, _) = resolve(&[("Content-Encoding", "gzip, BR"), ("Accept-Ranges", "bytes")]);
        let encodings = parsed.get("content-encoding").unwrap();
        assert!(encodings.has_token("gzip"));
        assert!(encodings.has_token("br"));
        assert!(parsed.get("accept-ranges").unwrap().has_token("bytes"));
    }

    #[test]
    fn test_set_cookie_keeps_each_occurrence() {
        let (parsed, notes) = resolve(&[
            ("Set-Cookie", "SID=31d4d96e407aad42; Path=/; Secure; HttpOnly"),
            ("Set-Cookie", "lang=en-US; Path=/; Domain=example.com"),
        ]);
        assert_eq!(parsed.get("set-cookie").unwrap().as_list().unwrap().len(), 2);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_rejected_cookie_gets_no_extra_bad_syntax() {
        let (parsed, notes) = resolve(&[("Set-Cookie", "novalue")]);
        assert!(parsed.get("set-cookie").is_none());
        assert_eq!(notes.kinds(), vec![NoteKind::SetCookieNoVal]);
    }

    #[test]
    fn test_etag_and_last_modified() {
        let (parsed, notes) = resolve(&[
            ("ETag", r#"W/"abc""#),
            ("Last-Modified", "Sun, 06 Nov 1994 08:49:37 GMT"),
        ]);
        let tag = parsed.get("etag").and_then(|v| v.as_entity_tag()).unwrap();
        assert!(tag.weak);
        assert_eq!(parsed.get("last-modified").and_then(|v| v.as_date()), Some(784111777));
        assert!(notes.is_empty());

        let (parsed, notes) = resolve(&[("Last-Modified", "last tuesday")]);
        assert!(parsed.get("last-modified").is_none());
        assert_eq!(notes.kinds(), vec![NoteKind::BadSyntax]);
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = HeaderRegistry::standard();
        let before = registry.len();
        registry.register(HeaderHandler::new("content-length", crate::headers::handler::parse_text));
        assert_eq!(registry.len(), before);
        assert!(registry.lookup("Content-Length").is_some());
    }
}

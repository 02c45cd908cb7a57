//! Set-Cookie, parsed the way user agents do (RFC 6265 §5.2).
//!
//! Every occurrence is kept. Problems with individual attributes produce
//! notes and drop only that attribute; a cookie with no value or no name is
//! dropped entirely.

use serde::{Deserialize, Serialize};

use crate::headers::date::parse_cookie_date;
use crate::headers::handler::{join_all, HeaderContext, HeaderHandler, ParseError};
use crate::headers::value::FieldValue;
use crate::notes::NoteKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value")]
pub enum CookieAttribute {
    /// Seconds since the epoch.
    Expires(i64),
    #[serde(rename = "Max-Age")]
    MaxAge(u64),
    Domain(String),
    Path(String),
    Secure,
    HttpOnly,
    SameSite(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub attributes: Vec<CookieAttribute>,
}

pub fn handler() -> HeaderHandler {
    HeaderHandler::new("Set-Cookie", parse).with_join(join_all)
}

fn parse(value: &str, cx: &mut HeaderContext<'_>) -> Result<FieldValue, ParseError> {
    loose_parse(value, cx).map(FieldValue::Cookie)
}

/// RFC 6265 §5.1.4 default-path.
fn default_path(uri_path: &str) -> String {
    if !uri_path.starts_with('/') || uri_path.matches('/').count() < 2 {
        return "/".to_string();
    }
    match uri_path.rfind('/') {
        Some(idx) => uri_path[..idx].to_string(),
        None => "/".to_string(),
    }
}

fn loose_parse(set_cookie: &str, cx: &mut HeaderContext<'_>) -> Result<SetCookie, ParseError> {
    let (pair, mut unparsed) = set_cookie.split_once(';').unwrap_or((set_cookie, ""));

    let Some((name, value)) = pair.split_once('=') else {
        cx.note(NoteKind::SetCookieNoVal, &[("pair", pair.trim())]);
        return Err(ParseError::Reported);
    };
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() {
        cx.note(NoteKind::SetCookieNoName, &[]);
        return Err(ParseError::Reported);
    }

    let mut attributes = Vec::new();
    while !unparsed.is_empty() {
        let (cookie_av, rest) = unparsed.split_once(';').unwrap_or((unparsed, ""));
        unparsed = rest;

        let (attr_name, attr_value) = cookie_av.split_once('=').unwrap_or((cookie_av, ""));
        let (attr_name, attr_value) = (attr_name.trim(), attr_value.trim());
        if attr_name.is_empty() {
            continue;
        }

        match attr_name.to_ascii_lowercase().as_str() {
            "expires" => match parse_cookie_date(attr_value) {
                Ok(secs) => attributes.push(CookieAttribute::Expires(secs)),
                Err(why) => cx.note(
                    NoteKind::SetCookieBadDate,
                    &[("cookie_name", name), ("why", why.to_string().as_str())],
                ),
            },
            "max-age" => {
                if attr_value.is_empty() {
                    cx.note(NoteKind::SetCookieEmptyMaxAge, &[("cookie_name", name)]);
                } else if attr_value.starts_with('0') {
                    cx.note(NoteKind::SetCookieLeadingZeroMaxAge, &[("cookie_name", name)]);
                } else if !attr_value.bytes().all(|b| b.is_ascii_digit()) {
                    cx.note(NoteKind::SetCookieNonDigitMaxAge, &[("cookie_name", name)]);
                } else {
                    let secs = attr_value.parse().unwrap_or(u64::MAX);
                    attributes.push(CookieAttribute::MaxAge(secs));
                }
            }
            "domain" => {
                if attr_value.is_empty() {
                    cx.note(NoteKind::SetCookieEmptyDomain, &[("cookie_name", name)]);
                } else {
                    let domain = attr_value.strip_prefix('.').unwrap_or(attr_value);
                    attributes.push(CookieAttribute::Domain(domain.to_string()));
                }
            }
            "path" => {
                let path = if attr_value.starts_with('/') {
                    attr_value.to_string()
                } else {
                    default_path(cx.base_path)
                };
                attributes.push(CookieAttribute::Path(path));
            }
            "secure" => attributes.push(CookieAttribute::Secure),
            "httponly" => attributes.push(CookieAttribute::HttpOnly),
            "samesite" => attributes.push(CookieAttribute::SameSite(attr_value.to_string())),
            _ => cx.note(
                NoteKind::SetCookieUnknownAttribute,
                &[("cookie_name", name), ("attribute", attr_name)],
            ),
        }
    }

    Ok(SetCookie {
        name: name.to_string(),
        value: value.to_string(),
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::NoteList;

    fn parse_one(value: &str, base_path: &str) -> (Result<SetCookie, ParseError>, NoteList) {
        let mut notes = NoteList::new();
        let result = {
            let mut cx = HeaderContext::new("Set-Cookie", base_path, &mut notes);
            loose_parse(value, &mut cx)
        };
        (result, notes)
    }

    #[test]
    fn test_basic_cookie() {
        let (cookie, notes) = parse_one("SID=31d4d96e407aad42", "/");
        let cookie = cookie.unwrap();
        assert_eq!(cookie.name, "SID");
        assert_eq!(cookie.value, "31d4d96e407aad42");
        assert!(cookie.attributes.is_empty());
        assert!(notes.is_empty());
    }

    #[test]
    fn test_flags_and_attributes() {
        let (cookie, _) = parse_one("SID=31d4d96e407aad42; Path=/; Secure; HttpOnly", "/");
        assert_eq!(
            cookie.unwrap().attributes,
            vec![
                CookieAttribute::Path("/".into()),
                CookieAttribute::Secure,
                CookieAttribute::HttpOnly
            ]
        );
    }

    #[test]
    fn test_expires() {
        let (cookie, notes) = parse_one("lang=en-US; Expires=Wed, 09 Jun 2021 10:18:14 GMT", "/");
        assert_eq!(cookie.unwrap().attributes, vec![CookieAttribute::Expires(1623233894)]);
        assert!(notes.is_empty());

        let (cookie, _) = parse_one("lang=; Expires=Sun, 06 Nov 1994 08:49:37 GMT", "/");
        let cookie = cookie.unwrap();
        assert_eq!(cookie.value, "");
        assert_eq!(cookie.attributes, vec![CookieAttribute::Expires(784111777)]);
    }

    #[test]
    fn test_bad_expires_is_noted() {
        let (cookie, notes) = parse_one("lang=en; Expires=someday", "/");
        assert!(cookie.unwrap().attributes.is_empty());
        assert_eq!(notes.kinds(), vec![NoteKind::SetCookieBadDate]);
    }

    #[test]
    fn test_max_age_rules() {
        let (cookie, _) = parse_one("lang=en-US; Max-Age=123", "/");
        assert_eq!(cookie.unwrap().attributes, vec![CookieAttribute::MaxAge(123)]);

        let (cookie, notes) = parse_one("lang=en-US; Max-Age=0123", "/");
        assert!(cookie.unwrap().attributes.is_empty());
        assert_eq!(notes.kinds(), vec![NoteKind::SetCookieLeadingZeroMaxAge]);

        let (_, notes) = parse_one("lang=en-US; Max-Age=", "/");
        assert_eq!(notes.kinds(), vec![NoteKind::SetCookieEmptyMaxAge]);

        let (_, notes) = parse_one("lang=en-US; Max-Age=12a", "/");
        assert_eq!(notes.kinds(), vec![NoteKind::SetCookieNonDigitMaxAge]);
    }

    #[test]
    fn test_leading_dot_domain() {
        let (cookie, notes) = parse_one(
            "WR_SID=50.56.234.188.1393830943825054; path=/; max-age=315360000; domain=.wolframalpha.com",
            "/",
        );
        assert_eq!(
            cookie.unwrap().attributes,
            vec![
                CookieAttribute::Path("/".into()),
                CookieAttribute::MaxAge(315360000),
                CookieAttribute::Domain("wolframalpha.com".into()),
            ]
        );
        assert!(notes.is_empty());
    }

    #[test]
    fn test_default_path_from_request() {
        let (cookie, _) = parse_one("a=b; Path=", "/shop/cart/view");
        assert_eq!(cookie.unwrap().attributes, vec![CookieAttribute::Path("/shop/cart".into())]);

        let (cookie, _) = parse_one("a=b; Path=relative", "/index.html");
        assert_eq!(cookie.unwrap().attributes, vec![CookieAttribute::Path("/".into())]);
    }

    #[test]
    fn test_missing_value_and_name() {
        let (cookie, notes) = parse_one("novalue", "/");
        assert_eq!(cookie, Err(ParseError::Reported));
        assert_eq!(notes.kinds(), vec![NoteKind::SetCookieNoVal]);

        let (cookie, notes) = parse_one("=value", "/");
        assert_eq!(cookie, Err(ParseError::Reported));
        assert_eq!(notes.kinds(), vec![NoteKind::SetCookieNoName]);
    }

    #[test]
    fn test_unknown_attribute() {
        let (cookie, notes) = parse_one("a=b; Priority=High", "/");
        assert!(cookie.unwrap().attributes.is_empty());
        assert_eq!(notes.kinds(), vec![NoteKind::SetCookieUnknownAttribute]);
    }
}

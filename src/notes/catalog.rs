//! The fixed catalog of note kinds.
//!
//! Every kind carries a severity level, a category and a message template.
//! Templates use `{name}` placeholders; the set of placeholders must match
//! the substitution keys supplied wherever the kind is raised.

use serde::{Deserialize, Serialize};

/// Catalog revision. Bump when kinds are added, removed or reworded.
pub const CATALOG_VERSION: u32 = 1;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
    Info,
    Warning,
    BadPractice,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::BadPractice => "bad-practice",
            Level::Error => "error",
        }
    }
}

/// Broad area of HTTP a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    General,
    Security,
    ContentNegotiation,
    Caching,
    Validation,
    Range,
}

/// Static description of one note kind.
#[derive(Debug, Clone, Copy)]
pub struct NoteSpec {
    pub id: &'static str,
    pub level: Level,
    pub category: Category,
    pub template: &'static str,
    pub keys: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteKind {
    // Header framework
    BadSyntax,
    SingleHeaderRepeat,
    HeaderNotChecked,
    BadContentEncoding,
    BodyTruncated,

    // X-Frame-Options
    FrameOptionsDeny,
    FrameOptionsSameorigin,
    FrameOptionsUnknown,

    // Set-Cookie
    SetCookieNoVal,
    SetCookieNoName,
    SetCookieBadDate,
    SetCookieEmptyMaxAge,
    SetCookieLeadingZeroMaxAge,
    SetCookieNonDigitMaxAge,
    SetCookieEmptyDomain,
    SetCookieUnknownAttribute,

    // ETag validation
    InmSubreqProblem,
    #[serde(rename = "inm-304")]
    Inm304,
    InmFull,
    InmDupEtagWeak,
    InmDupEtagStrong,
    InmUnknown,
    InmStatus,
    #[serde(rename = "missing-hdrs-304")]
    MissingHdrs304,

    // Last-Modified validation
    LmSubreqProblem,
    #[serde(rename = "ims-304")]
    Ims304,
    ImsFull,
    ImsUnknown,
    ImsStatus,

    // Partial content
    RangeSubreqProblem,
    RangeCorrect,
    RangeIncorrect,
    RangeFull,
    RangeStatus,
    RangeNegMismatch,
}

impl NoteKind {
    pub const ALL: &'static [NoteKind] = &[
        NoteKind::BadSyntax,
        NoteKind::SingleHeaderRepeat,
        NoteKind::HeaderNotChecked,
        NoteKind::BadContentEncoding,
        NoteKind::BodyTruncated,
        NoteKind::FrameOptionsDeny,
        NoteKind::FrameOptionsSameorigin,
        NoteKind::FrameOptionsUnknown,
        NoteKind::SetCookieNoVal,
        NoteKind::SetCookieNoName,
        NoteKind::SetCookieBadDate,
        NoteKind::SetCookieEmptyMaxAge,
        NoteKind::SetCookieLeadingZeroMaxAge,
        NoteKind::SetCookieNonDigitMaxAge,
        NoteKind::SetCookieEmptyDomain,
        NoteKind::SetCookieUnknownAttribute,
        NoteKind::InmSubreqProblem,
        NoteKind::Inm304,
        NoteKind::InmFull,
        NoteKind::InmDupEtagWeak,
        NoteKind::InmDupEtagStrong,
        NoteKind::InmUnknown,
        NoteKind::InmStatus,
        NoteKind::MissingHdrs304,
        NoteKind::LmSubreqProblem,
        NoteKind::Ims304,
        NoteKind::ImsFull,
        NoteKind::ImsUnknown,
        NoteKind::ImsStatus,
        NoteKind::RangeSubreqProblem,
        NoteKind::RangeCorrect,
        NoteKind::RangeIncorrect,
        NoteKind::RangeFull,
        NoteKind::RangeStatus,
        NoteKind::RangeNegMismatch,
    ];

    pub fn spec(self) -> NoteSpec {
        use Category::*;
        use Level::*;

        let (id, level, category, template, keys): (_, _, _, _, &'static [&'static str]) = match self {
            NoteKind::BadSyntax => (
                "bad-syntax",
                BadPractice,
                General,
                "The {field_name} header's syntax isn't valid.",
                &["field_name"],
            ),
            NoteKind::SingleHeaderRepeat => (
                "single-header-repeat",
                BadPractice,
                General,
                "Only one {field_name} header is allowed in a message; only the first was used.",
                &["field_name"],
            ),
            NoteKind::HeaderNotChecked => (
                "header-not-checked",
                Warning,
                General,
                "The {field_name} header contains characters that aren't printable ASCII, so it wasn't checked.",
                &["field_name"],
            ),
            NoteKind::BadContentEncoding => (
                "bad-content-encoding",
                BadPractice,
                ContentNegotiation,
                "The body couldn't be decoded as {encoding}: {problem}.",
                &["encoding", "problem"],
            ),
            NoteKind::BodyTruncated => (
                "body-truncated",
                Info,
                General,
                "Only the first {limit} bytes of the body were kept for analysis.",
                &["limit"],
            ),
            NoteKind::FrameOptionsDeny => (
                "frame-options-deny",
                Info,
                Security,
                "This response prevents itself from being framed.",
                &[],
            ),
            NoteKind::FrameOptionsSameorigin => (
                "frame-options-sameorigin",
                Info,
                Security,
                "This response prevents itself from being framed by other sites.",
                &[],
            ),
            NoteKind::FrameOptionsUnknown => (
                "frame-options-unknown",
                Warning,
                Security,
                "This response contains an X-Frame-Options value that isn't understood.",
                &[],
            ),
            NoteKind::SetCookieNoVal => (
                "set-cookie-no-val",
                BadPractice,
                General,
                "The Set-Cookie value '{pair}' doesn't contain an '=' and was ignored.",
                &["pair"],
            ),
            NoteKind::SetCookieNoName => (
                "set-cookie-no-name",
                BadPractice,
                General,
                "A Set-Cookie header has an empty cookie name and was ignored.",
                &[],
            ),
            NoteKind::SetCookieBadDate => (
                "set-cookie-bad-date",
                Warning,
                General,
                "The {cookie_name} cookie has an Expires date that can't be parsed ({why}); it will be ignored.",
                &["cookie_name", "why"],
            ),
            NoteKind::SetCookieEmptyMaxAge => (
                "set-cookie-empty-max-age",
                Warning,
                General,
                "The {cookie_name} cookie has an empty Max-Age attribute; it will be ignored.",
                &["cookie_name"],
            ),
            NoteKind::SetCookieLeadingZeroMaxAge => (
                "set-cookie-leading-zero-max-age",
                Warning,
                General,
                "The {cookie_name} cookie has a Max-Age with a leading zero; it will be ignored.",
                &["cookie_name"],
            ),
            NoteKind::SetCookieNonDigitMaxAge => (
                "set-cookie-non-digit-max-age",
                Warning,
                General,
                "The {cookie_name} cookie has a Max-Age containing non-digits; it will be ignored.",
                &["cookie_name"],
            ),
            NoteKind::SetCookieEmptyDomain => (
                "set-cookie-empty-domain",
                Warning,
                General,
                "The {cookie_name} cookie has an empty Domain attribute; it will be ignored.",
                &["cookie_name"],
            ),
            NoteKind::SetCookieUnknownAttribute => (
                "set-cookie-unknown-attribute",
                Warning,
                General,
                "The {cookie_name} cookie has an unknown attribute, '{attribute}'.",
                &["cookie_name", "attribute"],
            ),
            NoteKind::InmSubreqProblem => (
                "inm-subreq-problem",
                Info,
                Validation,
                "The If-None-Match check couldn't be completed: {problem}.",
                &["problem"],
            ),
            NoteKind::Inm304 => (
                "inm-304",
                Info,
                Validation,
                "If-None-Match conditional requests are supported.",
                &[],
            ),
            NoteKind::InmFull => (
                "inm-full",
                Warning,
                Validation,
                "An ETag is present, but an If-None-Match request for it returned the full, unchanged content.",
                &[],
            ),
            NoteKind::InmDupEtagWeak => (
                "inm-dup-etag-weak",
                Info,
                Validation,
                "During validation the weak ETag stayed the same although the body changed.",
                &[],
            ),
            NoteKind::InmDupEtagStrong => (
                "inm-dup-etag-strong",
                BadPractice,
                Validation,
                "During validation the strong ETag {etag} stayed the same although the body changed.",
                &["etag"],
            ),
            NoteKind::InmUnknown => (
                "inm-unknown",
                Info,
                Validation,
                "An If-None-Match request returned the full content, but the content had changed.",
                &[],
            ),
            NoteKind::InmStatus => (
                "inm-status",
                Info,
                Validation,
                "An If-None-Match request returned an unexpected status, {inm_status}.",
                &["inm_status"],
            ),
            NoteKind::MissingHdrs304 => (
                "missing-hdrs-304",
                Warning,
                Validation,
                "The 304 response to an {subreq_type} request is missing headers the full response had: {missing_hdrs}.",
                &["subreq_type", "missing_hdrs"],
            ),
            NoteKind::LmSubreqProblem => (
                "lm-subreq-problem",
                Info,
                Validation,
                "The If-Modified-Since check couldn't be completed: {problem}.",
                &["problem"],
            ),
            NoteKind::Ims304 => (
                "ims-304",
                Info,
                Validation,
                "If-Modified-Since conditional requests are supported.",
                &[],
            ),
            NoteKind::ImsFull => (
                "ims-full",
                Warning,
                Validation,
                "A Last-Modified date is present, but an If-Modified-Since request for it returned the full, unchanged content.",
                &[],
            ),
            NoteKind::ImsUnknown => (
                "ims-unknown",
                Info,
                Validation,
                "An If-Modified-Since request returned the full content, but the content had changed.",
                &[],
            ),
            NoteKind::ImsStatus => (
                "ims-status",
                Info,
                Validation,
                "An If-Modified-Since request returned an unexpected status, {ims_status}.",
                &["ims_status"],
            ),
            NoteKind::RangeSubreqProblem => (
                "range-subreq-problem",
                Info,
                Range,
                "The partial content check couldn't be completed: {problem}.",
                &["problem"],
            ),
            NoteKind::RangeCorrect => (
                "range-correct",
                Info,
                Range,
                "A ranged request returned the correct partial content.",
                &[],
            ),
            NoteKind::RangeIncorrect => (
                "range-incorrect",
                BadPractice,
                Range,
                "A ranged request for {range} returned the wrong partial content.",
                &["range"],
            ),
            NoteKind::RangeFull => (
                "range-full",
                Warning,
                Range,
                "Partial content is advertised, but a ranged request returned the full response.",
                &[],
            ),
            NoteKind::RangeStatus => (
                "range-status",
                Info,
                Range,
                "A ranged request returned an unexpected status, {range_status}.",
                &["range_status"],
            ),
            NoteKind::RangeNegMismatch => (
                "range-neg-mismatch",
                BadPractice,
                Range,
                "Partial responses don't carry the same Content-Encoding as full responses.",
                &[],
            ),
        };

        NoteSpec {
            id,
            level,
            category,
            template,
            keys,
        }
    }

    pub fn id(self) -> &'static str {
        self.spec().id
    }

    pub fn level(self) -> Level {
        self.spec().level
    }

    pub fn category(self) -> Category {
        self.spec().category
    }
}

impl std::fmt::Display for NoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Placeholder names appearing in a template, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                found.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    found
}

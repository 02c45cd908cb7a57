//! Active checks: derived sub-requests that exercise validator behavior.
//!
//! # Data Flow
//! ```text
//! completed base Exchange
//!     → CheckKind::bind(base) → Box<dyn ActiveCheck>
//!     → preflight()                     (skip when false)
//!     → sub_request()                   (base method/URI + modified headers)
//!     → fetched under the tree deadline by the orchestrator
//!     → complete(sub_response, notes)   (problem note, or done())
//!     → notes appended to the base response
//! ```
//!
//! # Design Decisions
//! - A check is a small value borrowing its base; nothing outlives the orchestration
//! - Checks never retry; a failed sub-fetch becomes one note
//! - Comparisons are deterministic so replaying a base gives the same outcome

pub mod etag_validate;
pub mod lm_validate;
pub mod range;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::message::{Exchange, ExchangeRequest, HttpMessage};
use crate::notes::{NoteKind, NoteList, Subject};

pub use etag_validate::EtagValidate;
pub use lm_validate::LmValidate;
pub use range::RangeValidate;

/// Headers a 304 should carry when the full response had them.
pub const HEADERS_304: [&str; 5] = ["cache-control", "content-location", "etag", "expires", "vary"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    EtagValidate,
    LmValidate,
    Range,
}

impl CheckKind {
    pub const ALL: [CheckKind; 3] = [CheckKind::EtagValidate, CheckKind::LmValidate, CheckKind::Range];

    pub fn name(self) -> &'static str {
        match self {
            CheckKind::EtagValidate => "etag-validate",
            CheckKind::LmValidate => "lm-validate",
            CheckKind::Range => "range",
        }
    }

    /// Construct the check against a completed base exchange.
    pub fn bind<'a>(self, base: &'a Exchange) -> Box<dyn ActiveCheck + 'a> {
        match self {
            CheckKind::EtagValidate => Box::new(EtagValidate::new(base)),
            CheckKind::LmValidate => Box::new(LmValidate::new(base)),
            CheckKind::Range => Box::new(RangeValidate::new(base)),
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CheckKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown check '{}'", s))
    }
}

pub trait ActiveCheck: Send + Sync {
    fn kind(&self) -> CheckKind;

    fn base(&self) -> &Exchange;

    /// Subject on the base response that outcome notes attach to.
    fn subject(&self) -> Subject;

    /// Note raised when the sub-request doesn't complete.
    fn problem_note(&self) -> NoteKind;

    /// Whether the base response warrants this check at all.
    fn preflight(&self) -> bool;

    /// Full header list for the sub-request.
    fn modify_request_headers(&self) -> Vec<(String, String)>;

    /// Compare a completed sub-response against the base.
    fn done(&self, sub: &HttpMessage, notes: &mut NoteList);

    fn sub_request(&self) -> ExchangeRequest {
        let base = &self.base().request;
        ExchangeRequest {
            method: base.method.clone(),
            uri: base.uri.clone(),
            headers: self.modify_request_headers(),
        }
    }

    /// Record the outcome of a finished sub-fetch, successful or not.
    fn complete(&self, sub: &HttpMessage, notes: &mut NoteList) {
        match &sub.error {
            Some(error) => notes.add_note(
                self.subject(),
                self.problem_note(),
                &[("problem", error.to_string().as_str())],
            ),
            None => self.done(sub, notes),
        }
    }
}

/// Base request headers minus any existing copy of `name`, plus `name: value`.
pub(crate) fn with_request_header(base: &ExchangeRequest, name: &str, value: String) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = base
        .headers
        .iter()
        .filter(|(n, _)| !n.eq_ignore_ascii_case(name))
        .cloned()
        .collect();
    headers.push((name.to_string(), value));
    headers
}

/// Note headers the base response had that a 304 dropped.
pub(crate) fn check_missing_headers(base: &HttpMessage, sub: &HttpMessage, subreq_type: &str, notes: &mut NoteList) {
    let missing: Vec<&str> = HEADERS_304
        .iter()
        .copied()
        .filter(|h| base.parsed_headers.contains(h) && !sub.parsed_headers.contains(h))
        .collect();

    if !missing.is_empty() {
        notes.add_note(
            Subject::Headers,
            NoteKind::MissingHdrs304,
            &[("missing_hdrs", missing.join(", ").as_str()), ("subreq_type", subreq_type)],
        );
    }
}

/// A finished check, as kept in the result tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveCheckResult {
    pub request: ExchangeRequest,
    pub response: HttpMessage,
}

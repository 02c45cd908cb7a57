//! Partial content support: request a byte range of the base body.

use crate::active_check::{with_request_header, ActiveCheck, CheckKind};
use crate::message::{Exchange, HttpMessage};
use crate::notes::{NoteKind, NoteList, Subject};

/// Largest range requested, in bytes.
const MAX_RANGE_LEN: usize = 96;

pub struct RangeValidate<'a> {
    base: &'a Exchange,
}

impl<'a> RangeValidate<'a> {
    pub fn new(base: &'a Exchange) -> Self {
        Self { base }
    }

    /// Inclusive byte range, drawn from the middle third of the body.
    fn range(&self) -> Option<(usize, usize)> {
        let len = self.base.response.body.len();
        if len == 0 {
            return None;
        }
        let start = len / 3;
        let end = (start + MAX_RANGE_LEN - 1).min(len - 1);
        Some((start, end))
    }

    fn range_spec(&self) -> Option<String> {
        self.range().map(|(start, end)| format!("bytes={}-{}", start, end))
    }
}

impl ActiveCheck for RangeValidate<'_> {
    fn kind(&self) -> CheckKind {
        CheckKind::Range
    }

    fn base(&self) -> &Exchange {
        self.base
    }

    fn subject(&self) -> Subject {
        Subject::header("accept-ranges")
    }

    fn problem_note(&self) -> NoteKind {
        NoteKind::RangeSubreqProblem
    }

    fn preflight(&self) -> bool {
        let base = &self.base.response;
        let advertised = base
            .parsed_headers
            .get("accept-ranges")
            .map(|v| v.has_token("bytes"))
            .unwrap_or(false);

        advertised && base.status == Some(200) && !base.truncated && self.range().is_some()
    }

    fn modify_request_headers(&self) -> Vec<(String, String)> {
        match self.range_spec() {
            Some(spec) => with_request_header(&self.base.request, "Range", spec),
            None => self.base.request.headers.clone(),
        }
    }

    fn done(&self, sub: &HttpMessage, notes: &mut NoteList) {
        let base = &self.base.response;
        let (Some((start, end)), Some(spec)) = (self.range(), self.range_spec()) else {
            return;
        };

        if sub.status == Some(206) {
            if sub.content_codings() != base.content_codings() {
                notes.add_note(self.subject(), NoteKind::RangeNegMismatch, &[]);
            } else if sub.body.as_slice() == &base.body[start..=end] {
                notes.add_note(self.subject(), NoteKind::RangeCorrect, &[]);
            } else {
                notes.add_note(self.subject(), NoteKind::RangeIncorrect, &[("range", spec.as_str())]);
            }
        } else if sub.status == base.status {
            notes.add_note(self.subject(), NoteKind::RangeFull, &[]);
        } else {
            let status = sub.status.map(|s| s.to_string()).unwrap_or_else(|| "(unknown)".to_string());
            notes.add_note(self.subject(), NoteKind::RangeStatus, &[("range_status", status.as_str())]);
        }
    }
}

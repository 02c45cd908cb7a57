//! If-Modified-Since validation against the base Last-Modified.

use crate::active_check::{check_missing_headers, with_request_header, ActiveCheck, CheckKind};
use crate::headers::date::format_http_date;
use crate::message::{Exchange, HttpMessage};
use crate::notes::{NoteKind, NoteList, Subject};

pub struct LmValidate<'a> {
    base: &'a Exchange,
}

impl<'a> LmValidate<'a> {
    pub fn new(base: &'a Exchange) -> Self {
        Self { base }
    }

    fn last_modified(&self) -> Option<i64> {
        self.base
            .response
            .parsed_headers
            .get("last-modified")
            .and_then(|v| v.as_date())
    }
}

impl ActiveCheck for LmValidate<'_> {
    fn kind(&self) -> CheckKind {
        CheckKind::LmValidate
    }

    fn base(&self) -> &Exchange {
        self.base
    }

    fn subject(&self) -> Subject {
        Subject::header("last-modified")
    }

    fn problem_note(&self) -> NoteKind {
        NoteKind::LmSubreqProblem
    }

    fn preflight(&self) -> bool {
        self.last_modified().and_then(format_http_date).is_some()
    }

    fn modify_request_headers(&self) -> Vec<(String, String)> {
        match self.last_modified().and_then(format_http_date) {
            Some(date) => with_request_header(&self.base.request, "If-Modified-Since", date),
            None => self.base.request.headers.clone(),
        }
    }

    fn done(&self, sub: &HttpMessage, notes: &mut NoteList) {
        let base = &self.base.response;

        if sub.status == Some(304) {
            notes.add_note(self.subject(), NoteKind::Ims304, &[]);
            check_missing_headers(base, sub, "If-Modified-Since", notes);
        } else if sub.status == base.status {
            if sub.content_hash == base.content_hash {
                notes.add_note(self.subject(), NoteKind::ImsFull, &[]);
            } else {
                notes.add_note(self.subject(), NoteKind::ImsUnknown, &[]);
            }
        } else {
            let status = sub.status.map(|s| s.to_string()).unwrap_or_else(|| "(unknown)".to_string());
            notes.add_note(self.subject(), NoteKind::ImsStatus, &[("ims_status", status.as_str())]);
        }
    }
}

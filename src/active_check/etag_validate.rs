//! If-None-Match validation against the base ETag.

use crate::active_check::{check_missing_headers, with_request_header, ActiveCheck, CheckKind};
use crate::headers::EntityTag;
use crate::message::{Exchange, HttpMessage};
use crate::notes::{NoteKind, NoteList, Subject};

pub struct EtagValidate<'a> {
    base: &'a Exchange,
}

impl<'a> EtagValidate<'a> {
    pub fn new(base: &'a Exchange) -> Self {
        Self { base }
    }

    fn etag(&self) -> Option<&EntityTag> {
        self.base
            .response
            .parsed_headers
            .get("etag")
            .and_then(|v| v.as_entity_tag())
    }
}

impl ActiveCheck for EtagValidate<'_> {
    fn kind(&self) -> CheckKind {
        CheckKind::EtagValidate
    }

    fn base(&self) -> &Exchange {
        self.base
    }

    fn subject(&self) -> Subject {
        Subject::header("etag")
    }

    fn problem_note(&self) -> NoteKind {
        NoteKind::InmSubreqProblem
    }

    fn preflight(&self) -> bool {
        self.etag().is_some()
    }

    fn modify_request_headers(&self) -> Vec<(String, String)> {
        match self.etag() {
            Some(tag) => with_request_header(&self.base.request, "If-None-Match", tag.to_string()),
            None => self.base.request.headers.clone(),
        }
    }

    fn done(&self, sub: &HttpMessage, notes: &mut NoteList) {
        let base = &self.base.response;
        let Some(base_tag) = self.etag() else {
            return;
        };

        if sub.status == Some(304) {
            notes.add_note(self.subject(), NoteKind::Inm304, &[]);
            check_missing_headers(base, sub, "If-None-Match", notes);
        } else if sub.status == base.status {
            if sub.content_hash == base.content_hash {
                notes.add_note(self.subject(), NoteKind::InmFull, &[]);
            } else {
                let sub_tag = sub.parsed_headers.get("etag").and_then(|v| v.as_entity_tag());
                if sub_tag == Some(base_tag) {
                    if base_tag.weak {
                        notes.add_note(self.subject(), NoteKind::InmDupEtagWeak, &[]);
                    } else {
                        notes.add_note(
                            self.subject(),
                            NoteKind::InmDupEtagStrong,
                            &[("etag", base_tag.to_string().as_str())],
                        );
                    }
                } else {
                    notes.add_note(self.subject(), NoteKind::InmUnknown, &[]);
                }
            }
        } else {
            let status = sub.status.map(|s| s.to_string()).unwrap_or_else(|| "(unknown)".to_string());
            notes.add_note(self.subject(), NoteKind::InmStatus, &[("inm_status", status.as_str())]);
        }
    }
}

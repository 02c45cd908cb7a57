//! X-Frame-Options: framing policy.

use crate::headers::handler::{parse_text, HeaderContext, HeaderHandler, Joined};
use crate::notes::NoteKind;

pub fn handler() -> HeaderHandler {
    HeaderHandler::new("X-Frame-Options", parse_text).with_join(join)
}

/// Keeps every occurrence, lowercased, and reports the strongest policy
/// present. Unrecognized values are kept as text.
fn join(values: Vec<String>, cx: &mut HeaderContext<'_>) -> Joined {
    let values: Vec<String> = values.iter().map(|v| v.to_ascii_lowercase()).collect();

    if values.iter().any(|v| v == "deny") {
        cx.note(NoteKind::FrameOptionsDeny, &[]);
    } else if values.iter().any(|v| v == "sameorigin") {
        cx.note(NoteKind::FrameOptionsSameorigin, &[]);
    } else {
        cx.note(NoteKind::FrameOptionsUnknown, &[]);
    }

    Joined::Many(values)
}

//! Note records and the append-only note list.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::notes::catalog::{Category, Level, NoteKind};

/// The part of an exchange a note is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "part", content = "name")]
pub enum Subject {
    /// The message as a whole.
    Message,
    Status,
    /// The header block as a whole.
    Headers,
    /// One header, by lowercase name.
    Header(String),
    Body,
}

impl Subject {
    /// Subject for a header; names are normalized to lowercase.
    pub fn header(name: &str) -> Self {
        Subject::Header(name.to_ascii_lowercase())
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Message => f.write_str("message"),
            Subject::Status => f.write_str("status"),
            Subject::Headers => f.write_str("headers"),
            Subject::Header(name) => write!(f, "header-{}", name),
            Subject::Body => f.write_str("body"),
        }
    }
}

/// One diagnostic finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub subject: Subject,
    pub kind: NoteKind,
    /// Substitution values for the kind's template.
    pub vars: BTreeMap<String, String>,
}

impl Note {
    pub fn new(subject: Subject, kind: NoteKind, vars: &[(&str, &str)]) -> Self {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        debug_assert!(
            {
                let expected = kind.spec().keys;
                expected.len() == vars.len() && expected.iter().all(|k| vars.contains_key(*k))
            },
            "substitutions {:?} don't match the keys of {}",
            vars.keys().collect::<Vec<_>>(),
            kind
        );

        Self { subject, kind, vars }
    }

    pub fn level(&self) -> Level {
        self.kind.level()
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Render the human-readable text.
    pub fn render(&self) -> String {
        let mut text = self.kind.spec().template.to_string();
        for (key, value) in &self.vars {
            text = text.replace(&format!("{{{}}}", key), value);
        }
        text
    }
}

/// Append-only list of notes owned by one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteList {
    notes: Vec<Note>,
}

impl NoteList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a note. Repeated calls add repeated notes.
    pub fn add_note(&mut self, subject: Subject, kind: NoteKind, vars: &[(&str, &str)]) {
        self.notes.push(Note::new(subject, kind, vars));
    }

    pub fn push(&mut self, note: Note) {
        self.notes.push(note);
    }

    pub fn append(&mut self, other: NoteList) {
        self.notes.extend(other.notes);
    }

    /// Notes attached to `subject`, in attachment order. The returned
    /// iterator is lazy and can be cloned to restart it.
    pub fn notes_for<'a>(
        &'a self,
        subject: &'a Subject,
    ) -> impl Iterator<Item = &'a Note> + Clone + 'a {
        self.notes.iter().filter(move |n| &n.subject == subject)
    }

    /// Kinds of all notes, in attachment order.
    pub fn kinds(&self) -> Vec<NoteKind> {
        self.notes.iter().map(|n| n.kind).collect()
    }

    pub fn contains(&self, kind: NoteKind) -> bool {
        self.notes.iter().any(|n| n.kind == kind)
    }

    pub fn count(&self, kind: NoteKind) -> usize {
        self.notes.iter().filter(|n| n.kind == kind).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl<'a> IntoIterator for &'a NoteList {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_vars() {
        let note = Note::new(
            Subject::header("Content-Length"),
            NoteKind::BadSyntax,
            &[("field_name", "Content-Length")],
        );
        assert_eq!(note.render(), "The Content-Length header's syntax isn't valid.");
        assert_eq!(note.subject.to_string(), "header-content-length");
    }

    #[test]
    fn test_notes_for_is_restartable() {
        let mut notes = NoteList::new();
        let etag = Subject::header("etag");
        notes.add_note(etag.clone(), NoteKind::Inm304, &[]);
        notes.add_note(Subject::Message, NoteKind::BodyTruncated, &[("limit", "10")]);
        notes.add_note(etag.clone(), NoteKind::InmFull, &[]);

        let iter = notes.notes_for(&etag);
        let first: Vec<NoteKind> = iter.clone().map(|n| n.kind).collect();
        let second: Vec<NoteKind> = iter.map(|n| n.kind).collect();
        assert_eq!(first, vec![NoteKind::Inm304, NoteKind::InmFull]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_repeated_notes_accumulate() {
        let mut notes = NoteList::new();
        notes.add_note(Subject::header("etag"), NoteKind::Inm304, &[]);
        notes.add_note(Subject::header("etag"), NoteKind::Inm304, &[]);
        assert_eq!(notes.count(NoteKind::Inm304), 2);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_missing_substitution_is_caught() {
        Note::new(Subject::Message, NoteKind::BadSyntax, &[]);
    }

    #[test]
    fn test_subject_serialization() {
        let json = serde_json::to_string(&Subject::header("ETag")).unwrap();
        assert_eq!(json, r#"{"part":"header","name":"etag"}"#);
    }
}

//! Header handler records.
//!
//! A handler bundles the three steps applied to one header name during
//! resolution: a per-occurrence syntax check, a join that folds surviving
//! occurrences into one logical value, and a parse of that value.

use thiserror::Error;

use crate::headers::syntax;
use crate::headers::value::FieldValue;
use crate::notes::{NoteKind, NoteList, Subject};

/// Whether a header may legitimately appear more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Repeatable,
}

/// Result of folding the surviving occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Joined {
    /// One logical value, parsed once.
    One(String),
    /// Several list members, each parsed on its own.
    Many(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The value doesn't fit the header's grammar.
    #[error("invalid field value")]
    Invalid,
    /// The value was rejected and the handler already recorded why.
    #[error("field value rejected")]
    Reported,
}

/// State handed to join and parse functions while one header resolves.
pub struct HeaderContext<'a> {
    /// Canonical field name, used in note text.
    pub field_name: &'a str,
    pub subject: Subject,
    /// Path of the request URI, for defaults that depend on it.
    pub base_path: &'a str,
    notes: &'a mut NoteList,
}

impl<'a> HeaderContext<'a> {
    pub fn new(field_name: &'a str, base_path: &'a str, notes: &'a mut NoteList) -> Self {
        Self {
            field_name,
            subject: Subject::header(field_name),
            base_path,
            notes,
        }
    }

    pub fn note(&mut self, kind: NoteKind, vars: &[(&str, &str)]) {
        self.notes.add_note(self.subject.clone(), kind, vars);
    }
}

pub type SyntaxCheck = fn(&str) -> bool;
pub type JoinFn = fn(Vec<String>, &mut HeaderContext<'_>) -> Joined;
pub type ParseFn = fn(&str, &mut HeaderContext<'_>) -> Result<FieldValue, ParseError>;

#[derive(Clone, Copy)]
pub struct HeaderHandler {
    pub name: &'static str,
    pub cardinality: Cardinality,
    pub syntax: SyntaxCheck,
    pub join: JoinFn,
    pub parse: ParseFn,
    /// Note raised when an occurrence fails the syntax check.
    pub syntax_note: NoteKind,
}

impl HeaderHandler {
    /// Repeatable handler with printable-ASCII syntax and last-wins join.
    pub fn new(name: &'static str, parse: ParseFn) -> Self {
        Self {
            name,
            cardinality: Cardinality::Repeatable,
            syntax: syntax::is_printable,
            join: join_last,
            parse,
            syntax_note: NoteKind::BadSyntax,
        }
    }

    pub fn single(mut self) -> Self {
        self.cardinality = Cardinality::Single;
        self
    }

    pub fn with_syntax(mut self, syntax: SyntaxCheck) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn with_join(mut self, join: JoinFn) -> Self {
        self.join = join;
        self
    }

    /// Fallback for names without a registered handler.
    pub fn generic() -> Self {
        Self {
            syntax_note: NoteKind::HeaderNotChecked,
            ..Self::new("generic", parse_text)
        }
    }
}

impl std::fmt::Debug for HeaderHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderHandler")
            .field("name", &self.name)
            .field("cardinality", &self.cardinality)
            .field("syntax_note", &self.syntax_note)
            .finish()
    }
}

pub fn join_last(mut values: Vec<String>, _cx: &mut HeaderContext<'_>) -> Joined {
    Joined::One(values.pop().unwrap_or_default())
}

pub fn join_all(values: Vec<String>, _cx: &mut HeaderContext<'_>) -> Joined {
    Joined::Many(values)
}

/// Flatten comma-separated occurrences into one list.
pub fn join_list(values: Vec<String>, _cx: &mut HeaderContext<'_>) -> Joined {
    Joined::Many(
        values
            .iter()
            .flat_map(|v| syntax::split_list(v))
            .map(str::to_string)
            .collect(),
    )
}

pub fn parse_text(value: &str, _cx: &mut HeaderContext<'_>) -> Result<FieldValue, ParseError> {
    Ok(FieldValue::Text(value.to_string()))
}

/// Case-insensitive token, normalized to lowercase.
pub fn parse_token(value: &str, _cx: &mut HeaderContext<'_>) -> Result<FieldValue, ParseError> {
    if syntax::is_token(value) {
        Ok(FieldValue::Token(value.to_ascii_lowercase()))
    } else {
        Err(ParseError::Invalid)
    }
}

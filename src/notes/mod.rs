//! Diagnostics data model.
//!
//! # Data Flow
//! ```text
//! header handlers / active checks / orchestrator
//!     → NoteList::add_note(subject, kind, vars)
//!     → notes accumulate on the owning HttpMessage
//!     → presentation layer filters with notes_for(subject) and renders
//! ```
//!
//! # Design Decisions
//! - The catalog is a closed enum; each kind owns its level, category and template
//! - Notes are append-only; nothing is ever retracted
//! - Substitution keys are checked against the template in debug builds

pub mod catalog;
pub mod note;

pub use catalog::{Category, Level, NoteKind, NoteSpec, CATALOG_VERSION};
pub use note::{Note, NoteList, Subject};

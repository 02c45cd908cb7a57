//! Saved analyses.
//!
//! # Design Decisions
//! - One JSON file per analysis, named by its UUID
//! - Ids are parsed as UUIDs before touching the filesystem

pub mod snapshot;

pub use snapshot::{SnapshotError, SnapshotStore};

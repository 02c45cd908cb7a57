//! JSON snapshot store keyed by UUID.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::resource::ResourceCheckResult;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'{0}' is not a valid analysis id")]
    InvalidId(String),

    #[error("no saved analysis with id {0}")]
    NotFound(Uuid),
}

pub struct SnapshotStore {
    save_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
        }
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.save_dir.join(format!("{}.json", id.hyphenated()))
    }

    /// Write a result under a fresh id and return that id.
    pub fn save(&self, result: &ResourceCheckResult) -> Result<Uuid, SnapshotError> {
        fs::create_dir_all(&self.save_dir)?;

        let id = Uuid::new_v4();
        let json = serde_json::to_vec_pretty(result)?;
        let final_path = self.path_for(id);
        let tmp_path = final_path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &final_path)?;

        tracing::info!(id = %id, uri = %result.uri, "Analysis saved");
        Ok(id)
    }

    pub fn load(&self, id: &str) -> Result<ResourceCheckResult, SnapshotError> {
        let id = Uuid::parse_str(id.trim()).map_err(|_| SnapshotError::InvalidId(id.to_string()))?;

        let bytes = match fs::read(self.path_for(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(SnapshotError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}

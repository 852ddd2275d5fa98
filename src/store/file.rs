//! File-backed model store — one JSON artifact on local disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::ModelStore;
use crate::error::StoreError;
use crate::nlp::classifier::TrainedModel;

/// Stores the model artifact at `dir/file`, creating `dir` on save.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(dir: impl AsRef<Path>, file: &str) -> Self {
        Self {
            path: dir.as_ref().join(file),
        }
    }

    /// Full path of the artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelStore for FileModelStore {
    fn save(&self, model: &TrainedModel) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_vec(model)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "Model artifact saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<TrainedModel>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let model = serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!(path = %self.path.display(), "Model artifact loaded");
        Ok(Some(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::corpus::load_seed_corpus;

    fn trained() -> TrainedModel {
        TrainedModel::fit(&load_seed_corpus(None).unwrap()).unwrap()
    }

    #[test]
    fn load_missing_artifact_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path(), "model.json");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path().join("artifacts"), "model.json");
        let model = trained();
        store.save(&model).unwrap();

        let loaded = store.load().unwrap().expect("artifact present");
        assert_eq!(loaded.vocab_size(), model.vocab_size());
        assert_eq!(loaded.trained_at, model.trained_at);
    }

    #[test]
    fn corrupt_artifact_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path(), "model.json");
        fs::write(store.path(), b"{ not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn save_overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path(), "model.json");
        let model = trained();
        store.save(&model).unwrap();
        store.save(&model).unwrap();
        assert!(store.load().unwrap().is_some());
    }
}

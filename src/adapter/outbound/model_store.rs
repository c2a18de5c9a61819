//! JSON persistence of trained models.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{DurationModel, ReopenRiskModel};
use crate::error::ModelError;

pub const DURATION_MODEL_FILE: &str = "case_duration_linear.json";
pub const REOPEN_MODEL_FILE: &str = "reopen_risk_logistic.json";

/// Models present on disk; either may be missing.
#[derive(Debug, Clone, Default)]
pub struct StoredModels {
    pub duration: Option<DurationModel>,
    pub reopen: Option<ReopenRiskModel>,
}

/// Reads and writes models under one directory.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load whatever models exist. Unreadable files are logged and skipped.
    #[must_use]
    pub fn load(&self) -> StoredModels {
        StoredModels {
            duration: self.read(DURATION_MODEL_FILE),
            reopen: self.read(REOPEN_MODEL_FILE),
        }
    }

    /// Persist whichever models are present, each through a temporary file.
    ///
    /// # Errors
    ///
    /// [`ModelError::Persist`] on any I/O or serialization failure.
    pub fn save(&self, models: &StoredModels) -> Result<(), ModelError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ModelError::Persist(format!("{}: {e}", self.dir.display())))?;
        if let Some(duration) = &models.duration {
            self.write(DURATION_MODEL_FILE, duration)?;
        }
        if let Some(reopen) = &models.reopen {
            self.write(REOPEN_MODEL_FILE, reopen)?;
        }
        info!(dir = %self.dir.display(), "Saved models");
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.dir.join(name);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable model file");
                None
            }
        }
    }

    fn write<T: Serialize>(&self, name: &str, model: &T) -> Result<(), ModelError> {
        let path = self.dir.join(name);
        let tmp = path.with_extension("json.tmp");
        let json =
            serde_json::to_string_pretty(model).map_err(|e| ModelError::Persist(e.to_string()))?;
        std::fs::write(&tmp, json)
            .and_then(|()| std::fs::rename(&tmp, &path))
            .map_err(|e| ModelError::Persist(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::case_features;
    use crate::testkit::domain::sample_log;

    #[test]
    fn missing_directory_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let stored = ModelStore::new(dir.path().join("absent")).load();
        assert!(stored.duration.is_none());
        assert!(stored.reopen.is_none());
    }

    #[test]
    fn saved_models_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        let features = case_features(&sample_log());
        let duration = DurationModel::train(&features).unwrap();
        let reopen = ReopenRiskModel::train(&features).unwrap();

        store
            .save(&StoredModels {
                duration: Some(duration.clone()),
                reopen: Some(reopen),
            })
            .unwrap();
        assert!(dir.path().join(DURATION_MODEL_FILE).exists());

        let stored = store.load();
        let loaded = stored.duration.unwrap();
        assert_eq!(loaded.evaluation.train_cases, duration.evaluation.train_cases);
        assert!(stored.reopen.is_some());
    }

    #[test]
    fn absent_model_leaves_its_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        let reopen = ReopenRiskModel::train(&case_features(&sample_log())).unwrap();

        store
            .save(&StoredModels {
                duration: None,
                reopen: Some(reopen),
            })
            .unwrap();
        assert!(!dir.path().join(DURATION_MODEL_FILE).exists());
        assert!(store.load().reopen.is_some());
    }

    #[test]
    fn corrupt_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DURATION_MODEL_FILE), "{not json").unwrap();
        assert!(ModelStore::new(dir.path()).load().duration.is_none());
    }
}

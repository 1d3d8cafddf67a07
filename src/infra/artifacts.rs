// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Saves and restores the artifacts of a training run as JSON.
//
// What gets saved per run:
//   1. encoder.json       — EncodingScheme (vocabularies,
//                           imputation stats, fingerprint)
//   2. salary_model.json  — SalaryModel (forest + the encoder
//                           fingerprint it was trained with)
//   3. train_config.json  — the TrainConfig used for the run
//
// File layout:
//   model/
//     encoder.json
//     salary_model.json
//     train_config.json
//     metrics.csv          ← appended by MetricsLogger
//
// Every write goes to "<name>.tmp" first and is renamed into
// place afterwards. `save_run` stages all three files before
// renaming any of them, so a failed run leaves the previous
// artifacts untouched. Staged files are removed again when any
// step fails.
//
// Why JSON?
//   The artifacts are small (a few hundred trees of splits) and
//   human-readable output makes a bad run easy to inspect. A
//   binary format would only pay off for much larger forests.
//
// Reference: Rust Book §9 (Error Handling)
//            std::fs::rename and serde_json documentation

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::data::encoding::EncodingScheme;
use crate::domain::error::PipelineError;
use crate::ml::model::SalaryModel;

pub const ENCODER_FILE: &str = "encoder.json";
pub const MODEL_FILE:   &str = "salary_model.json";
pub const CONFIG_FILE:  &str = "train_config.json";

/// Reads and writes the artifacts inside one directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn encoder_path(&self) -> PathBuf { self.dir.join(ENCODER_FILE) }

    pub fn model_path(&self) -> PathBuf { self.dir.join(MODEL_FILE) }

    pub fn config_path(&self) -> PathBuf { self.dir.join(CONFIG_FILE) }

    /// Persist everything a training run produced, overwriting the
    /// previous run's files.
    pub fn save_run(
        &self,
        scheme: &EncodingScheme,
        model:  &SalaryModel,
        cfg:    &TrainConfig,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| PipelineError::ArtifactWrite {
            path: self.dir.clone(),
            source,
        })?;

        let mut staged = Vec::with_capacity(3);
        let result = (|| -> Result<()> {
            staged.push(stage(&self.encoder_path(), scheme)?);
            staged.push(stage(&self.model_path(),   model)?);
            staged.push(stage(&self.config_path(),  cfg)?);
            for (tmp, target) in &staged {
                fs::rename(tmp, target).map_err(|source| PipelineError::ArtifactWrite {
                    path: target.clone(),
                    source,
                })?;
            }
            Ok(())
        })();

        if let Err(e) = result {
            discard(&staged);
            return Err(e);
        }

        tracing::info!("Artifacts written to '{}'", self.dir.display());
        Ok(())
    }

    /// Load and verify the encoder.
    pub fn load_encoder(&self) -> Result<EncodingScheme, PipelineError> {
        let path   = self.encoder_path();
        let scheme = read_json::<EncodingScheme>(&path)?;
        scheme
            .verify()
            .map_err(|reason| PipelineError::artifact_load(&path, reason))?;
        tracing::debug!("Loaded encoder {} ({} columns)", scheme.fingerprint(), scheme.width());
        Ok(scheme)
    }

    /// Load and verify the model.
    pub fn load_model(&self) -> Result<SalaryModel, PipelineError> {
        let path  = self.model_path();
        let model = read_json::<SalaryModel>(&path)?;
        model
            .verify()
            .map_err(|reason| PipelineError::artifact_load(&path, reason))?;
        tracing::debug!("Loaded model with {} trees", model.forest.trees().len());
        Ok(model)
    }

    pub fn load_config(&self) -> Result<TrainConfig, PipelineError> {
        read_json(&self.config_path())
    }
}

/// Write `value` to "<target>.tmp"; returns (tmp, target).
fn stage<T: Serialize>(target: &Path, value: &T) -> Result<(PathBuf, PathBuf)> {
    let tmp  = tmp_path(target);
    let json = serde_json::to_vec_pretty(value)
        .with_context(|| format!("Cannot serialise '{}'", target.display()))?;

    let write = || -> std::io::Result<()> {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(&json)?;
        f.sync_all()
    };
    if let Err(source) = write() {
        discard(&[(tmp.clone(), target.to_path_buf())]);
        return Err(PipelineError::ArtifactWrite { path: tmp, source }.into());
    }

    Ok((tmp, target.to_path_buf()))
}

/// Remove staging files. Ones already renamed into place are gone.
fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        if tmp.is_file() {
            if let Err(e) = fs::remove_file(tmp) {
                tracing::warn!("Could not remove staging file '{}': {}", tmp.display(), e);
            }
        }
    }
}

fn tmp_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let text = fs::read_to_string(path).map_err(|e| {
        PipelineError::artifact_load(path, format!("{e}. Have you run 'train' first?"))
    })?;
    serde_json::from_str(&text).map_err(|e| PipelineError::artifact_load(path, format!("corrupt JSON: {e}")))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{dataset::Dataset, preprocessor::Preprocessor};
    use crate::domain::record::EmployeeRecord;
    use crate::ml::forest::{ForestParams, RandomForestRegressor};
    use crate::ml::regressor::Regressor;

    fn fitted() -> (EncodingScheme, SalaryModel) {
        let ds = Dataset::new(vec![
            EmployeeRecord::new(25.0, "M", "Bachelors", "Analyst", 2.0, 50000.0),
            EmployeeRecord::new(40.0, "F", "PhD", "Manager", 12.0, 110000.0),
        ]);
        let scheme = Preprocessor::new().fit(&ds).unwrap();
        let x      = scheme.encode_all(ds.records());
        let params = ForestParams { n_trees: 3, ..ForestParams::default() };
        let forest = RandomForestRegressor::fit(x.view(), &ds.targets(), &params).unwrap();
        let model  = SalaryModel::new(&scheme, forest, ds.len());
        (scheme, model)
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("model"));
        let (scheme, model) = fitted();

        store.save_run(&scheme, &model, &TrainConfig::default()).unwrap();

        assert_eq!(store.load_encoder().unwrap(), scheme);
        assert_eq!(store.load_model().unwrap(), model);
        assert_eq!(store.load_config().unwrap().seed, TrainConfig::default().seed);
        // No staging files left behind
        assert!(!dir.path().join("model").join("encoder.json.tmp").exists());
    }

    #[test]
    fn test_failed_save_removes_staged_files() {
        let dir   = tempfile::tempdir().unwrap();
        let root  = dir.path().join("model");
        let store = ArtifactStore::new(&root);
        let (scheme, model) = fitted();

        // A directory where the last staging file should go makes that write fail
        fs::create_dir_all(root.join("train_config.json.tmp")).unwrap();

        let err = store.save_run(&scheme, &model, &TrainConfig::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::ArtifactWrite { .. })));
        assert!(!root.join("encoder.json.tmp").exists());
        assert!(!root.join("salary_model.json.tmp").exists());
        // Nothing was renamed into place either
        assert!(!store.encoder_path().exists());
        assert!(!store.model_path().exists());
    }

    #[test]
    fn test_missing_artifacts_fail_to_load() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(matches!(store.load_encoder(), Err(PipelineError::ArtifactLoad { .. })));
        assert!(matches!(store.load_model(),   Err(PipelineError::ArtifactLoad { .. })));
    }

    #[test]
    fn test_corrupt_artifact_fails_to_load() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        fs::write(store.model_path(), "{ not json").unwrap();
        let err = store.load_model().unwrap_err();
        assert!(err.to_string().contains("corrupt JSON"));
    }

    #[test]
    fn test_tmp_path_keeps_directory() {
        let p = tmp_path(Path::new("/a/b/encoder.json"));
        assert_eq!(p, PathBuf::from("/a/b/encoder.json.tmp"));
    }
}

// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run:
//
//   Step 1: Load the CSV dataset        (Layer 4 - data)
//   Step 2: Split, fit encoder + forest (Layer 5 - ml)
//   Step 3: Persist encoder/model/config (Layer 6 - infra)
//   Step 4: Append holdout metrics      (Layer 6 - infra)
//
// Nothing is written unless Step 2 succeeds, so degenerate
// data never replaces a working model.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::CsvLoader;
use crate::domain::error::PipelineError;
use crate::domain::traits::RecordSource;
use crate::infra::{artifacts::ArtifactStore, metrics::MetricsLogger};
use crate::ml::forest::ForestParams;
use crate::ml::tree::{MaxFeatures, TreeParams};
use crate::ml::trainer::{train, TrainReport};

// ─── Training Configuration ──────────────────────────────────────────────────
// Every knob of a training run. Saved next to the artifacts as
// train_config.json so a run can be traced back to its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub dataset_path:      String,
    pub artifact_dir:      String,
    /// Share of labelled records withheld for evaluation, in [0, 1).
    pub holdout_fraction:  f64,
    /// Drives both the split and the forest.
    pub seed:              u64,
    pub n_trees:           usize,
    pub max_depth:         Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    pub max_features:      MaxFeatures,
    pub bootstrap:         bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset_path:      "data/employee_data.csv".to_string(),
            artifact_dir:      "model".to_string(),
            holdout_fraction:  0.2,
            seed:              42,
            n_trees:           100,
            max_depth:         None,
            min_samples_split: 2,
            min_samples_leaf:  1,
            max_features:      MaxFeatures::All,
            bootstrap:         true,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |field: &str, message: String| PipelineError::InvalidConfig {
            field: field.to_string(),
            message,
        };

        if !(0.0..1.0).contains(&self.holdout_fraction) {
            return Err(invalid("holdout_fraction", format!("{} is not in [0, 1)", self.holdout_fraction)));
        }
        if self.n_trees == 0 {
            return Err(invalid("n_trees", "must be at least 1".into()));
        }
        if self.max_depth == Some(0) {
            return Err(invalid("max_depth", "must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(invalid("min_samples_split", "must be at least 2".into()));
        }
        if self.min_samples_leaf == 0 {
            return Err(invalid("min_samples_leaf", "must be at least 1".into()));
        }
        if let MaxFeatures::Fraction(f) = self.max_features {
            if !(f > 0.0 && f <= 1.0) {
                return Err(invalid("max_features", format!("fraction {f} is not in (0, 1]")));
            }
        }
        Ok(())
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees:   self.n_trees,
            bootstrap: self.bootstrap,
            seed:      self.seed,
            tree: TreeParams {
                max_depth:         self.max_depth,
                min_samples_split: self.min_samples_split,
                min_samples_leaf:  self.min_samples_leaf,
                max_features:      self.max_features,
            },
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainReport> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load the dataset ──────────────────────────────────────────
        tracing::info!("Loading dataset from '{}'", cfg.dataset_path);
        let dataset = CsvLoader::new(&cfg.dataset_path).load()?;

        // ── Step 2: Fit encoder and model ─────────────────────────────────────
        let outcome = train(&dataset, cfg).context("Training aborted; no artifacts were written")?;

        // ── Step 3: Persist artifacts ─────────────────────────────────────────
        let store = ArtifactStore::new(&cfg.artifact_dir);
        store.save_run(&outcome.scheme, &outcome.model, cfg)?;

        // ── Step 4: Record holdout metrics ────────────────────────────────────
        let logger = MetricsLogger::new(&cfg.artifact_dir)?;
        logger.log(
            outcome.report.n_train,
            outcome.report.holdout.as_ref(),
            outcome.scheme.fingerprint(),
        )?;
        tracing::debug!("Holdout metrics appended to '{}'", logger.csv_path().display());

        tracing::info!("Training complete. Encoder {}", outcome.scheme.fingerprint());
        Ok(outcome.report)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};

    const TOY_CSV: &str = "\
Age,Gender,Education Level,Job Title,Years of Experience,Salary
25,M,Bachelors,Analyst,2,50000
30,F,Masters,Analyst,5,70000
40,M,PhD,Manager,12,110000
22,F,Bachelors,Analyst,1,45000
";

    fn config_for(dir: &Path, csv: &str) -> TrainConfig {
        let dataset = dir.join("employees.csv");
        fs::write(&dataset, csv).unwrap();
        TrainConfig {
            dataset_path:     dataset.to_string_lossy().into_owned(),
            artifact_dir:     dir.join("model").to_string_lossy().into_owned(),
            holdout_fraction: 0.0,
            n_trees:          20,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let cfg = TrainConfig { holdout_fraction: 1.0, ..TrainConfig::default() };
        assert!(matches!(cfg.validate(), Err(PipelineError::InvalidConfig { .. })));
        let cfg = TrainConfig { max_features: MaxFeatures::Fraction(0.0), ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_execute_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_for(dir.path(), TOY_CSV);

        let report = TrainUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(report.n_train, 4);

        let store = ArtifactStore::new(&cfg.artifact_dir);
        assert!(store.encoder_path().exists());
        assert!(store.model_path().exists());
        assert_eq!(store.load_config().unwrap(), cfg);
        assert!(Path::new(&cfg.artifact_dir).join("metrics.csv").exists());
    }

    #[test]
    fn test_degenerate_data_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "Age,Gender,Education Level,Job Title,Years of Experience,Salary\n\
                   25,M,Bachelors,Analyst,2,50000\n\
                   30,F,Masters,Analyst,5,50000\n";
        let cfg = config_for(dir.path(), csv);

        let err = TrainUseCase::new(cfg.clone()).execute().unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::DegenerateData(_))));
        assert!(!Path::new(&cfg.artifact_dir).exists());
    }

    #[test]
    fn test_missing_dataset_is_data_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            dataset_path: dir.path().join("nope.csv").to_string_lossy().into_owned(),
            artifact_dir: dir.path().join("model").to_string_lossy().into_owned(),
            ..TrainConfig::default()
        };
        let err = TrainUseCase::new(cfg).execute().unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::DataAccess { .. })));
    }
}

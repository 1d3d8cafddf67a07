// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Loads the persisted encoder and model once, pairs them into a
// SalaryPredictor and answers queries with it.
//
//   Step 1: Load encoder.json and salary_model.json (Layer 6)
//   Step 2: Refuse a mismatched pair                (Layer 5)
//   Step 3: Predict, surfacing every warning in the log
//
// Why load once?
//   The forest is the largest artifact and never changes
//   between queries, so a long-lived caller (a server, a REPL)
//   builds one PredictUseCase and reuses it.
//
// train_config.json is informational here: a missing or old
// config only produces a warning, never a failed prediction.

use anyhow::Result;
use std::path::Path;

use crate::domain::prediction::Prediction;
use crate::domain::record::SalaryQuery;
use crate::domain::traits::SalaryEstimator;
use crate::infra::artifacts::ArtifactStore;
use crate::ml::inferencer::SalaryPredictor;

pub struct PredictUseCase {
    predictor: SalaryPredictor,
}

impl PredictUseCase {
    pub fn new(artifact_dir: impl AsRef<Path>) -> Result<Self> {
        let store = ArtifactStore::new(artifact_dir.as_ref());

        // ── Step 1: Load artifacts ────────────────────────────────────────────
        let scheme = store.load_encoder()?;
        let model  = store.load_model()?;

        // ── Step 2: Pair them ─────────────────────────────────────────────────
        let predictor = SalaryPredictor::new(scheme, model)?;
        tracing::info!(
            "Loaded model from '{}' ({} trees on {} records, encoder {})",
            store.dir().display(),
            predictor.model().forest.trees().len(),
            predictor.model().trained_on,
            predictor.scheme().fingerprint()
        );

        let stats = predictor.scheme().imputation();
        tracing::debug!(
            "Missing inputs fall back to age {}, experience {}, '{}' / '{}' / '{}'",
            stats.age_median,
            stats.years_experience_median,
            stats.gender_mode,
            stats.education_level_mode,
            stats.job_title_mode
        );

        match store.load_config() {
            Ok(cfg) => tracing::debug!("Model trained with seed {} and {} trees", cfg.seed, cfg.n_trees),
            Err(e)  => tracing::warn!("Training config unavailable: {}", e),
        }

        Ok(Self { predictor })
    }

    // ── Step 3: Predict ───────────────────────────────────────────────────────
    pub fn predict(&self, query: &SalaryQuery) -> Prediction {
        let prediction = self.predictor.estimate(query);
        if !prediction.has_warnings() {
            return prediction;
        }
        for w in &prediction.validation_warnings {
            tracing::warn!("{}", w);
        }
        for w in &prediction.encoding_warnings {
            tracing::warn!("{}", w);
        }
        prediction
    }
}

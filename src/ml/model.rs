// ============================================================
// Layer 5 — SalaryModel
// ============================================================
// The persisted model artifact: the fitted forest plus the
// identity of the encoder it was trained against.
//
// `scheme_fingerprint` and `n_features` tie a model to exactly
// one EncodingScheme. SalaryPredictor refuses any other pairing,
// so a model can never be fed vectors in a column layout it
// has not seen.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::data::encoding::EncodingScheme;
use crate::ml::forest::RandomForestRegressor;
use crate::ml::regressor::Regressor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryModel {
    pub scheme_fingerprint: String,
    pub n_features:         usize,
    /// Number of training rows the forest saw.
    pub trained_on:         usize,
    pub forest:             RandomForestRegressor,
}

impl SalaryModel {
    pub fn new(scheme: &EncodingScheme, forest: RandomForestRegressor, trained_on: usize) -> Self {
        Self {
            scheme_fingerprint: scheme.fingerprint().to_string(),
            n_features:         scheme.width(),
            trained_on,
            forest,
        }
    }

    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        self.forest.predict_row(row)
    }

    /// Internal consistency of a model read back from disk.
    pub fn verify(&self) -> Result<(), String> {
        if self.forest.n_features() != self.n_features {
            return Err(format!(
                "forest expects {} features but the model records {}",
                self.forest.n_features(),
                self.n_features
            ));
        }
        self.forest.verify()
    }

    /// Whether this model was trained against `scheme`.
    pub fn check_pairing(&self, scheme: &EncodingScheme) -> Result<(), String> {
        if self.scheme_fingerprint != scheme.fingerprint() {
            return Err(format!(
                "model was trained with encoder {} but encoder {} was supplied",
                short(&self.scheme_fingerprint),
                short(scheme.fingerprint())
            ));
        }
        if self.n_features != scheme.width() {
            return Err(format!(
                "model expects {} features but the encoder produces {}",
                self.n_features,
                scheme.width()
            ));
        }
        Ok(())
    }
}

fn short(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

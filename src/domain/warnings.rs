// ============================================================
// Layer 3 — Pipeline Warnings
// ============================================================
// Conditions that are worth telling the caller about but must
// never abort a prediction:
//
//   EncodingWarning   — the encoder substituted something
//                       (unseen category, imputed value)
//   ValidationWarning — an input is outside the range the
//                       model was trained on

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::column::{CategoricalFeature, Column};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodingWarning {
    /// Category never seen during fit; its indicator block is all zero.
    UnseenCategory { feature: CategoricalFeature, value: String },
    /// Missing input replaced by the training-time statistic.
    Imputed { column: Column, substitute: String },
}

impl fmt::Display for EncodingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingWarning::UnseenCategory { feature, value } => {
                write!(f, "{feature} '{value}' was not seen during training; encoded as unknown")
            }
            EncodingWarning::Imputed { column, substitute } => {
                write!(f, "{column} missing; using training value {substitute}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    OutOfRange { column: Column, value: f64, min: f64, max: f64 },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::OutOfRange { column, value, min, max } => {
                write!(f, "{column} {value} is outside the plausible range [{min}, {max}]")
            }
        }
    }
}

// ============================================================
// Layer 5 — Prediction Service
// ============================================================
// SalaryPredictor owns one (EncodingScheme, SalaryModel) pair,
// injected at construction and never mutated afterwards. It is
// Send + Sync, so a server can share one behind an Arc.
//
// Per query:
//   1. range-check age and experience (warnings, not errors)
//   2. encode with the training-time scheme
//   3. run the forest on the single row

use crate::data::encoding::EncodingScheme;
use crate::domain::column::Column;
use crate::domain::error::PipelineError;
use crate::domain::prediction::Prediction;
use crate::domain::record::{EmployeeRecord, SalaryQuery};
use crate::domain::traits::SalaryEstimator;
use crate::domain::warnings::ValidationWarning;
use crate::ml::model::SalaryModel;

/// Plausible ages (inclusive).
pub const AGE_RANGE: (f64, f64) = (18.0, 65.0);
/// Plausible years of experience (inclusive).
pub const EXPERIENCE_RANGE: (f64, f64) = (0.0, 50.0);

#[derive(Debug, Clone)]
pub struct SalaryPredictor {
    scheme: EncodingScheme,
    model:  SalaryModel,
}

impl SalaryPredictor {
    /// Refuses a model that was trained against a different encoder.
    pub fn new(scheme: EncodingScheme, model: SalaryModel) -> Result<Self, PipelineError> {
        model.check_pairing(&scheme).map_err(PipelineError::ArtifactMismatch)?;
        Ok(Self { scheme, model })
    }

    pub fn scheme(&self) -> &EncodingScheme { &self.scheme }

    pub fn model(&self) -> &SalaryModel { &self.model }

    pub fn predict(&self, query: &SalaryQuery) -> Prediction {
        let validation_warnings = validate(query);

        let record: EmployeeRecord = query.clone().into();
        let encoded = self.scheme.encode(&record);
        let salary  = self.model.predict_row(encoded.vector.view());

        tracing::debug!("Predicted {:.2} for {:?}", salary, query);

        Prediction {
            predicted_salary:  salary,
            encoding_warnings: encoded.warnings,
            validation_warnings,
        }
    }
}

impl SalaryEstimator for SalaryPredictor {
    fn estimate(&self, query: &SalaryQuery) -> Prediction {
        self.predict(query)
    }
}

/// Range checks on the numeric inputs that are present.
pub fn validate(query: &SalaryQuery) -> Vec<ValidationWarning> {
    let checks = [
        (Column::Age,             query.age,              AGE_RANGE),
        (Column::YearsExperience, query.years_experience, EXPERIENCE_RANGE),
    ];

    checks
        .into_iter()
        .filter_map(|(column, value, (min, max))| {
            // Non-finite inputs are imputed by the encoder, not range-checked
            let value = value.filter(|v| v.is_finite())?;
            (!(min..=max).contains(&value))
                .then_some(ValidationWarning::OutOfRange { column, value, min, max })
        })
        .collect()
}

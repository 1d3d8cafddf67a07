// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams between layers:
//
//   RecordSource    — anything that yields a Dataset
//                     (CsvLoader reads one from disk)
//   SalaryEstimator — anything that answers a SalaryQuery
//                     (SalaryPredictor, or a stub in tests)
//
// The model capability itself ("fit(X, y)" / "predict(X)")
// is the Regressor trait in ml::regressor.

use anyhow::Result;

use crate::data::dataset::Dataset;
use crate::domain::prediction::Prediction;
use crate::domain::record::SalaryQuery;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can load employee records.
pub trait RecordSource {
    fn load(&self) -> Result<Dataset>;
}

// ─── SalaryEstimator ──────────────────────────────────────────────────────────
/// Any component that can turn one query into a salary estimate.
pub trait SalaryEstimator {
    fn estimate(&self, query: &SalaryQuery) -> Prediction;
}

// ============================================================
// Layer 5 — Regressor Capability
// ============================================================
// "fit(X, y) -> model, predict(X) -> y". The trainer and the
// predictor only talk to this trait; RandomForestRegressor is
// the one implementation shipped today.
//
// X is an ndarray view with one row per sample and one column
// per encoded feature, in EncodingScheme column order.

use anyhow::Result;
use ndarray::{ArrayView1, ArrayView2};

pub trait Regressor: Sized {
    type Params;

    /// Fit on `x` (one row per sample) against targets `y`.
    fn fit(x: ArrayView2<'_, f64>, y: &[f64], params: &Self::Params) -> Result<Self>;

    /// Number of input columns the model was fit on.
    fn n_features(&self) -> usize;

    /// Predict a single row.
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64;

    /// Predict every row of `x`.
    fn predict(&self, x: ArrayView2<'_, f64>) -> Vec<f64> {
        x.outer_iter().map(|row| self.predict_row(row)).collect()
    }
}

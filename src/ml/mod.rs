// ============================================================
// Layer 5 — ML / Model Layer
// ============================================================
// Everything that knows about the regression model:
//
//   regressor.rs  — the fit / predict capability (trait)
//   tree.rs       — CART regression tree
//   forest.rs     — bagged random forest of trees
//   model.rs      — persisted model artifact bound to one
//                   EncodingScheme fingerprint
//   trainer.rs    — split, fit encoder, fit forest, score
//                   the holdout
//   inferencer.rs — the prediction service: validate,
//                   encode, predict

/// The fit / predict capability
pub mod regressor;

/// CART regression tree
pub mod tree;

/// Random forest regressor
pub mod forest;

/// Model artifact bound to its encoder
pub mod model;

/// End-to-end training run
pub mod trainer;

/// Prediction service built from loaded artifacts
pub mod inferencer;

// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-system concerns shared by the use cases:
//
//   artifacts.rs — Saving and loading the encoder, the model
//                  and the training config as JSON. Writes go
//                  through a temp file + rename so a reader
//                  never sees a half-written artifact.
//
//   metrics.rs   — Holdout metrics (R², MAE, RMSE) and the
//                  CSV log they are appended to after each
//                  training run.

/// Encoder / model / config persistence
pub mod artifacts;

/// Holdout metrics and their CSV log
pub mod metrics;

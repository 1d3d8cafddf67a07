// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one goal: training, predicting or summarising the dataset.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination

// The training workflow, plus TrainConfig
pub mod train_use_case;

// Loading artifacts and answering salary queries
pub mod predict_use_case;

// Read-only dataset statistics
pub mod stats_use_case;

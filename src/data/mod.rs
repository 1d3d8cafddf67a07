// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the CSV file on disk and the dense
// feature matrix handed to the model.
//
//   employee_data.csv
//       │
//       ▼
//   CsvLoader       → typed EmployeeRecords (missing = None)
//       │
//       ▼
//   split_holdout   → seeded train / holdout partitions
//       │
//       ▼
//   Preprocessor    → fits an EncodingScheme on the training
//       │             partition (medians, modes, vocabularies)
//       ▼
//   EncodingScheme  → FeatureVector / ndarray Array2
//
// The same EncodingScheme value is persisted and reused by the
// prediction service, so the column layout can never drift
// between training and inference.

/// Reads the employee CSV into typed records
pub mod loader;

/// In-memory dataset with typed column access
pub mod dataset;

/// Seeded shuffle-and-split into train / holdout
pub mod splitter;

/// Fits imputation statistics and category vocabularies
pub mod preprocessor;

/// The persisted encoder and the feature vector / matrix types
pub mod encoding;

// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing what the
// system works with: employee records, salary queries, the
// names of the dataset columns, and the warnings / errors the
// pipeline can produce.
//
// Rules for this layer:
//   - NO file I/O
//   - NO model or encoding code
//   - Only plain Rust types and traits

// Column names and feature groups shared by every layer
pub mod column;

// A single employee row and a single prediction request
pub mod record;

// The answer returned for one query
pub mod prediction;

// Non-fatal conditions surfaced alongside predictions
pub mod warnings;

// The fatal error taxonomy
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;

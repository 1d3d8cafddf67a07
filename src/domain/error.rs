// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Fatal conditions only. Everything recoverable is a warning
// (see warnings.rs). Upper layers wrap these in anyhow with
// extra context; tests downcast back to PipelineError.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Dataset missing or malformed.
    #[error("cannot read dataset '{path}': {reason}")]
    DataAccess { path: PathBuf, reason: String },

    /// Encoder / model artifact missing, corrupt, or mismatched.
    #[error("cannot load artifact '{path}': {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },

    /// Encoder and model that were not produced by the same training run.
    #[error("encoder and model artifacts do not match: {0}")]
    ArtifactMismatch(String),

    #[error("cannot write artifact '{path}'")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Training data that cannot produce a meaningful model.
    #[error("degenerate training data: {0}")]
    DegenerateData(String),

    #[error("invalid configuration: {field} - {message}")]
    InvalidConfig { field: String, message: String },
}

impl PipelineError {
    pub fn data_access(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PipelineError::DataAccess { path: path.into(), reason: reason.into() }
    }

    pub fn artifact_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PipelineError::ArtifactLoad { path: path.into(), reason: reason.into() }
    }
}

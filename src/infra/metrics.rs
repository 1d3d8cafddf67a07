// ============================================================
// Layer 6 — Holdout Metrics
// ============================================================
// Scores the model on the holdout partition and appends one
// row per training run to a CSV file.
//
// Metrics recorded per run:
//   - n_train / n_holdout : partition sizes
//   - r2   : coefficient of determination (empty when the
//            holdout targets have no variance)
//   - mae  : mean absolute error
//   - rmse : root mean squared error
//   - encoder : fingerprint of the encoder used
//
// Output file: <artifact_dir>/metrics.csv
//
// Example CSV output:
//   n_train,n_holdout,r2,mae,rmse,encoder
//   298,75,0.912345,9876.543210,14210.004000,3f1a…

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

pub const METRICS_FILE: &str = "metrics.csv";

/// Error statistics on the holdout partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldoutMetrics {
    pub n_samples: usize,
    /// `None` when the holdout targets are all equal.
    pub r2:        Option<f64>,
    pub mae:       f64,
    pub rmse:      f64,
}

impl HoldoutMetrics {
    /// `None` for an empty holdout.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Option<Self> {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return None;
        }

        let pairs   = actual.iter().zip(predicted).take(n);
        let mean    = actual[..n].iter().sum::<f64>() / n as f64;
        let mut abs = 0.0;
        let mut sq  = 0.0;
        for (a, p) in pairs {
            abs += (a - p).abs();
            sq  += (a - p) * (a - p);
        }
        let ss_tot: f64 = actual[..n].iter().map(|a| (a - mean) * (a - mean)).sum();

        Some(Self {
            n_samples: n,
            r2:        (ss_tot > 0.0).then(|| 1.0 - sq / ss_tot),
            mae:       abs / n as f64,
            rmse:      (sq / n as f64).sqrt(),
        })
    }
}

/// Appends run metrics to `metrics.csv`.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join(METRICS_FILE);
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "n_train,n_holdout,r2,mae,rmse,encoder")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one run. A run without holdout leaves the metric cells empty.
    pub fn log(&self, n_train: usize, metrics: Option<&HoldoutMetrics>, encoder: &str) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;

        match metrics {
            Some(m) => writeln!(
                f,
                "{},{},{},{:.6},{:.6},{}",
                n_train,
                m.n_samples,
                m.r2.map(|r| format!("{r:.6}")).unwrap_or_default(),
                m.mae,
                m.rmse,
                encoder,
            )?,
            None => writeln!(f, "{n_train},0,,,,{encoder}")?,
        }

        tracing::debug!("Logged run metrics to '{}'", self.csv_path.display());
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let m = HoldoutMetrics::compute(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(m.r2, Some(1.0));
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.rmse, 0.0);
    }

    #[test]
    fn test_known_errors() {
        let m = HoldoutMetrics::compute(&[10.0, 20.0], &[12.0, 16.0]).unwrap();
        assert_eq!(m.mae, 3.0);
        assert!((m.rmse - 10.0_f64.sqrt()).abs() < 1e-12);
        // ss_tot = 50, ss_res = 20
        assert!((m.r2.unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_constant_holdout_has_no_r2() {
        let m = HoldoutMetrics::compute(&[5.0], &[7.0]).unwrap();
        assert_eq!(m.r2, None);
        assert!(HoldoutMetrics::compute(&[], &[]).is_none());
    }

    #[test]
    fn test_logger_appends_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        let m      = HoldoutMetrics::compute(&[10.0, 20.0], &[12.0, 16.0]).unwrap();
        logger.log(8, Some(&m), "abc").unwrap();
        logger.log(10, None, "def").unwrap();

        let text  = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "8,2,0.600000,3.000000,3.162278,abc");
        assert_eq!(lines[2], "10,0,,,,def");
    }
}

// ============================================================
// Layer 4 — Encoding Scheme
// ============================================================
// The encoder shared by training and inference.
//
// Feature vector layout (fixed, never reordered):
//
//   [ Age, Years of Experience,
//     Gender=<v0>, Gender=<v1>, ...,
//     Education Level=<v0>, ...,
//     Job Title=<v0>, ... ]
//
// Each vocabulary is sorted and deduplicated when the scheme
// is built, so a value's column index only depends on the set
// of values seen during fit.
//
// The fingerprint is a SHA-256 over the canonical layout plus
// the imputation statistics. The model artifact records the
// fingerprint it was trained against, and the prediction
// service refuses to pair a model with any other encoder.
//
// Why one-hot instead of label codes?
//   Label codes would impose an order on job titles that does
//   not exist. Trees can still split on one indicator column
//   at a time, and an unseen value simply lights up nothing.
//
// Reference: sha2 and ndarray crate documentation

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::column::{CategoricalFeature, NumericFeature};
use crate::domain::record::EmployeeRecord;
use crate::domain::warnings::EncodingWarning;

const FINGERPRINT_VERSION: &str = "salary-encoder/v1";

// ─── FeatureVector ────────────────────────────────────────────────────────────

/// One encoded row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] { &self.0 }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(self.as_slice())
    }
}

// ─── Vocabulary / ImputationStats ─────────────────────────────────────────────

/// Observed values of one categorical feature, sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub feature: CategoricalFeature,
    pub values:  Vec<String>,
}

impl Vocabulary {
    fn new(feature: CategoricalFeature, mut values: Vec<String>) -> Self {
        values.sort();
        values.dedup();
        Self { feature, values }
    }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.values.binary_search_by(|entry| entry.as_str().cmp(value)).ok()
    }

    fn is_canonical(&self) -> bool {
        self.values.windows(2).all(|w| w[0] < w[1])
    }
}

/// Training-time fill values for missing inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationStats {
    pub age_median:              f64,
    pub years_experience_median: f64,
    pub gender_mode:             String,
    pub education_level_mode:    String,
    pub job_title_mode:          String,
}

impl ImputationStats {
    pub fn median(&self, feature: NumericFeature) -> f64 {
        match feature {
            NumericFeature::Age             => self.age_median,
            NumericFeature::YearsExperience => self.years_experience_median,
        }
    }

    pub fn mode(&self, feature: CategoricalFeature) -> &str {
        match feature {
            CategoricalFeature::Gender         => &self.gender_mode,
            CategoricalFeature::EducationLevel => &self.education_level_mode,
            CategoricalFeature::JobTitle       => &self.job_title_mode,
        }
    }
}

// ─── EncodingScheme ───────────────────────────────────────────────────────────

/// Output of [`EncodingScheme::encode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub vector:   FeatureVector,
    pub warnings: Vec<EncodingWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingScheme {
    /// One per categorical feature, in `CategoricalFeature::ORDER`.
    vocabularies: Vec<Vocabulary>,
    imputation:   ImputationStats,
    fingerprint:  String,
}

impl EncodingScheme {
    /// Build a scheme from raw vocabularies. Values are sorted and
    /// deduplicated here.
    pub fn new(
        gender:          Vec<String>,
        education_level: Vec<String>,
        job_title:       Vec<String>,
        imputation:      ImputationStats,
    ) -> Self {
        let vocabularies = vec![
            Vocabulary::new(CategoricalFeature::Gender,         gender),
            Vocabulary::new(CategoricalFeature::EducationLevel, education_level),
            Vocabulary::new(CategoricalFeature::JobTitle,       job_title),
        ];
        let fingerprint = compute_fingerprint(&vocabularies, &imputation);
        Self { vocabularies, imputation, fingerprint }
    }

    pub fn fingerprint(&self) -> &str { &self.fingerprint }

    pub fn imputation(&self) -> &ImputationStats { &self.imputation }

    pub fn vocabulary(&self, feature: CategoricalFeature) -> &[String] {
        self.vocabularies
            .iter()
            .find(|v| v.feature == feature)
            .map(|v| v.values.as_slice())
            .unwrap_or(&[])
    }

    /// Total feature-vector width.
    pub fn width(&self) -> usize {
        NumericFeature::ORDER.len() + self.vocabularies.iter().map(Vocabulary::len).sum::<usize>()
    }

    /// Human readable name of every output column, in order.
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NumericFeature::ORDER
            .iter()
            .map(|f| f.column().header().to_string())
            .collect();
        for vocab in &self.vocabularies {
            names.extend(vocab.values.iter().map(|v| format!("{}={}", vocab.feature, v)));
        }
        names
    }

    /// Check that a deserialised scheme is internally consistent.
    pub fn verify(&self) -> Result<(), String> {
        let order: Vec<CategoricalFeature> = self.vocabularies.iter().map(|v| v.feature).collect();
        if order != CategoricalFeature::ORDER {
            return Err(format!("unexpected vocabulary order {order:?}"));
        }
        if let Some(bad) = self.vocabularies.iter().find(|v| !v.is_canonical()) {
            return Err(format!("{} vocabulary is not sorted and unique", bad.feature));
        }
        let expected = compute_fingerprint(&self.vocabularies, &self.imputation);
        if expected != self.fingerprint {
            return Err(format!(
                "fingerprint mismatch: stored {}, computed {}",
                self.fingerprint, expected
            ));
        }
        Ok(())
    }

    /// Encode one record. Pure: the same record and scheme always
    /// give the same vector and warnings.
    pub fn encode(&self, record: &EmployeeRecord) -> Encoded {
        let mut warnings = Vec::new();
        let mut values   = Vec::with_capacity(self.width());

        for feature in NumericFeature::ORDER {
            let value = match record.numeric(feature) {
                Some(v) => v,
                None => {
                    let median = self.imputation.median(feature);
                    warnings.push(EncodingWarning::Imputed {
                        column:     feature.column(),
                        substitute: median.to_string(),
                    });
                    median
                }
            };
            values.push(value);
        }

        for vocab in &self.vocabularies {
            let value = match record.categorical(vocab.feature) {
                Some(v) => v,
                None => {
                    let mode = self.imputation.mode(vocab.feature);
                    warnings.push(EncodingWarning::Imputed {
                        column:     vocab.feature.column(),
                        substitute: mode.to_string(),
                    });
                    mode
                }
            };

            let start = values.len();
            values.resize(start + vocab.len(), 0.0);
            match vocab.index_of(value) {
                Some(i) => values[start + i] = 1.0,
                None => warnings.push(EncodingWarning::UnseenCategory {
                    feature: vocab.feature,
                    value:   value.to_string(),
                }),
            }
        }

        Encoded { vector: FeatureVector(values), warnings }
    }

    /// Encode many records into one matrix, one row per record.
    pub fn encode_all(&self, records: &[EmployeeRecord]) -> Array2<f64> {
        let mut matrix      = Array2::zeros((records.len(), self.width()));
        let mut substituted = 0usize;
        for (mut row, record) in matrix.outer_iter_mut().zip(records) {
            let encoded = self.encode(record);
            substituted += encoded.warnings.len();
            row.assign(&encoded.vector.view());
        }
        if substituted > 0 {
            tracing::debug!("{} value(s) imputed or unseen while encoding {} rows", substituted, records.len());
        }
        matrix
    }
}

fn compute_fingerprint(vocabularies: &[Vocabulary], imputation: &ImputationStats) -> String {
    let mut hasher = Sha256::new();
    hasher.update(FINGERPRINT_VERSION.as_bytes());

    for feature in NumericFeature::ORDER {
        hasher.update(b"\nnum:");
        hasher.update(feature.column().header().as_bytes());
    }
    for vocab in vocabularies {
        hasher.update(format!("\ncat:{}:{}", vocab.feature.column().header(), vocab.len()).as_bytes());
        for value in &vocab.values {
            // Length prefix keeps "a,b" distinct from "a" + "b"
            hasher.update(format!("\n{}:", value.len()).as_bytes());
            hasher.update(value.as_bytes());
        }
    }

    hasher.update(format!(
        "\nimpute:{:016x}:{:016x}",
        imputation.age_median.to_bits(),
        imputation.years_experience_median.to_bits(),
    ).as_bytes());
    for mode in [&imputation.gender_mode, &imputation.education_level_mode, &imputation.job_title_mode] {
        hasher.update(format!("\n{}:", mode.len()).as_bytes());
        hasher.update(mode.as_bytes());
    }

    format!("{:x}", hasher.finalize())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn scheme() -> EncodingScheme {
        EncodingScheme::new(
            strings(&["M", "F"]),
            strings(&["PhD", "Bachelors", "Masters"]),
            strings(&["Manager", "Analyst", "Analyst"]),
            ImputationStats {
                age_median:              27.5,
                years_experience_median: 3.5,
                gender_mode:             "F".into(),
                education_level_mode:    "Bachelors".into(),
                job_title_mode:          "Analyst".into(),
            },
        )
    }

    #[test]
    fn test_layout_and_width() {
        let s = scheme();
        assert_eq!(s.width(), 2 + 2 + 3 + 2);
        assert_eq!(
            s.column_names(),
            vec![
                "Age", "Years of Experience",
                "Gender=F", "Gender=M",
                "Education Level=Bachelors", "Education Level=Masters", "Education Level=PhD",
                "Job Title=Analyst", "Job Title=Manager",
            ]
        );
    }

    #[test]
    fn test_encode_sets_one_bit_per_block() {
        let s = scheme();
        let r = EmployeeRecord::new(30.0, "M", "Masters", "Manager", 5.0, 0.0);
        let e = s.encode(&r);
        assert!(e.warnings.is_empty());
        assert_eq!(e.vector.as_slice(), &[30.0, 5.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let s = scheme();
        let r = EmployeeRecord::new(41.0, "X", "PhD", "Chef", 20.0, 0.0);
        assert_eq!(s.encode(&r), s.encode(&r));
    }

    #[test]
    fn test_unseen_category_is_zero_block() {
        let s = scheme();
        let r = EmployeeRecord::new(30.0, "F", "PhD", "Astronaut", 5.0, 0.0);
        let e = s.encode(&r);
        // Job Title is the last block: Analyst, Manager
        assert_eq!(&e.vector.as_slice()[7..], &[0.0, 0.0]);
        assert_eq!(
            e.warnings,
            vec![EncodingWarning::UnseenCategory {
                feature: CategoricalFeature::JobTitle,
                value:   "Astronaut".into(),
            }]
        );
    }

    #[test]
    fn test_missing_values_use_training_stats() {
        let s = scheme();
        let mut r = EmployeeRecord::new(0.0, "M", "PhD", "Analyst", 0.0, 0.0);
        r.age    = None;
        r.gender = None;
        let e = s.encode(&r);
        assert_eq!(e.vector.as_slice()[0], 27.5);
        // Gender=F is set by the mode
        assert_eq!(&e.vector.as_slice()[2..4], &[1.0, 0.0]);
        assert_eq!(e.warnings.len(), 2);
    }

    #[test]
    fn test_fingerprint_tracks_layout() {
        let a = scheme();
        let b = scheme();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert!(a.verify().is_ok());

        let mut imputation = a.imputation().clone();
        imputation.age_median = 28.0;
        let c = EncodingScheme::new(
            strings(&["F", "M"]),
            strings(&["Bachelors", "Masters", "PhD"]),
            strings(&["Analyst", "Manager"]),
            imputation,
        );
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_verify_detects_tampering() {
        let s = scheme();
        let mut json: serde_json::Value = serde_json::to_value(&s).unwrap();
        json["vocabularies"][2]["values"] = serde_json::json!(["Analyst", "Manager", "Zookeeper"]);
        let tampered: EncodingScheme = serde_json::from_value(json).unwrap();
        assert!(tampered.verify().is_err());
    }

    #[test]
    fn test_encode_all_shapes_matrix() {
        let s = scheme();
        let rows = vec![
            EmployeeRecord::new(25.0, "M", "Bachelors", "Analyst", 2.0, 50000.0),
            EmployeeRecord::new(30.0, "F", "Masters", "Analyst", 5.0, 70000.0),
        ];
        let m = s.encode_all(&rows);
        assert_eq!(m.nrows(), 2);
        assert_eq!(m.ncols(), s.width());
        assert_eq!(m[[1, 0]], 30.0);
        assert_eq!(m.row(0).to_vec(), s.encode(&rows[0]).vector.as_slice());
    }
}

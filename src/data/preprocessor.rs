// ============================================================
// Layer 4 — Preprocessor
// ============================================================
// Fits the EncodingScheme on a training dataset.
//
// Fit steps (applied in order):
//   1. Drop records with no usable Salary
//   2. Median of Age and Years of Experience over the
//      remaining records (missing values ignored)
//   3. Mode of Gender, Education Level and Job Title
//      (ties go to the lexicographically smallest value)
//   4. Vocabulary per categorical feature: sorted unique
//      values, with missing cells counted as the mode
//
// The medians and modes travel inside the scheme so that a
// query with a missing field is filled with the training-time
// value, never a statistic recomputed at inference time.

use std::collections::{BTreeMap, BTreeSet};

use crate::data::dataset::Dataset;
use crate::data::encoding::{EncodingScheme, ImputationStats};
use crate::domain::column::{CategoricalFeature, NumericFeature};
use crate::domain::error::PipelineError;
use crate::domain::record::EmployeeRecord;

/// Fill value for a categorical column that is missing in every record.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Fit imputation statistics and vocabularies on `dataset`.
    pub fn fit(&self, dataset: &Dataset) -> Result<EncodingScheme, PipelineError> {
        let labelled: Vec<&EmployeeRecord> = dataset.iter().filter(|r| r.has_target()).collect();
        if labelled.is_empty() {
            return Err(PipelineError::DegenerateData(
                "no records with a salary to fit the encoder on".into(),
            ));
        }

        let imputation = ImputationStats {
            age_median:              numeric_median(&labelled, NumericFeature::Age),
            years_experience_median: numeric_median(&labelled, NumericFeature::YearsExperience),
            gender_mode:             category_mode(&labelled, CategoricalFeature::Gender),
            education_level_mode:    category_mode(&labelled, CategoricalFeature::EducationLevel),
            job_title_mode:          category_mode(&labelled, CategoricalFeature::JobTitle),
        };

        let vocabulary = |feature: CategoricalFeature| -> Vec<String> {
            let fill = imputation.mode(feature);
            labelled
                .iter()
                .map(|r| r.categorical(feature).unwrap_or(fill))
                .collect::<BTreeSet<&str>>()
                .into_iter()
                .map(str::to_string)
                .collect()
        };

        let gender    = vocabulary(CategoricalFeature::Gender);
        let education = vocabulary(CategoricalFeature::EducationLevel);
        let job_title = vocabulary(CategoricalFeature::JobTitle);

        tracing::info!(
            "Encoder fit on {} records: {} gender, {} education, {} job title columns",
            labelled.len(),
            gender.len(),
            education.len(),
            job_title.len(),
        );
        tracing::debug!(
            "Imputation: age median {}, experience median {}",
            imputation.age_median,
            imputation.years_experience_median,
        );

        Ok(EncodingScheme::new(gender, education, job_title, imputation))
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

fn numeric_median(records: &[&EmployeeRecord], feature: NumericFeature) -> f64 {
    median(records.iter().filter_map(|r| r.numeric(feature)).collect()).unwrap_or_else(|| {
        tracing::warn!("{} is missing in every record; imputing 0", feature);
        0.0
    })
}

fn category_mode(records: &[&EmployeeRecord], feature: CategoricalFeature) -> String {
    mode(records.iter().filter_map(|r| r.categorical(feature)))
        .map(str::to_string)
        .unwrap_or_else(|| {
            tracing::warn!("{} is missing in every record; imputing '{}'", feature, UNKNOWN_CATEGORY);
            UNKNOWN_CATEGORY.to_string()
        })
}

/// Median of finite values; mean of the two middle values for an even count.
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Most frequent value. Ties resolve to the smallest value.
pub fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

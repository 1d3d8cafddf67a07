// ============================================================
// Layer 2 — StatsUseCase
// ============================================================
// Read-only summary of a dataset, used by the `stats` command
// and to put a prediction in context:
//
//   - salary distribution as a fixed-width histogram
//   - average salary per job title, lowest first
//   - mean salary per experience band, one series per
//     education level
//   - the distinct values a caller can choose per category
//   - the percentile of a given salary within the dataset
//
// Only records with a salary count towards salary figures.

use anyhow::Result;
use std::collections::BTreeMap;

use crate::data::dataset::Dataset;
use crate::data::loader::CsvLoader;
use crate::domain::column::CategoricalFeature;
use crate::domain::traits::RecordSource;

/// Bins in the salary histogram.
pub const HISTOGRAM_BINS: usize = 30;

/// Width of an experience band in years.
pub const EXPERIENCE_BAND_YEARS: f64 = 5.0;

/// Equal-width bins over [min, max]. The last bin includes `max`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges, ascending.
    pub edges:  Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// `None` when there is nothing to count.
    pub fn build(values: &[f64], bins: usize) -> Option<Self> {
        if values.is_empty() || bins == 0 {
            return None;
        }
        let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // A single distinct value gets a unit-wide range around it
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width  = (hi - lo) / bins as f64;
        let edges  = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0; bins];
        for &v in values {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Some(Self { edges, counts })
    }
}

/// Mean salary of the records whose experience falls in
/// [from_years, to_years).
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceBand {
    pub from_years:  f64,
    pub to_years:    f64,
    pub mean_salary: f64,
    pub count:       usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub n_records:      usize,
    pub n_with_salary:  usize,
    pub histogram:      Option<Histogram>,
    /// (job title, mean salary), sorted by mean salary ascending.
    pub average_by_job: Vec<(String, f64)>,
    /// (education level, bands ascending), levels sorted by name.
    /// Empty bands are left out.
    pub experience_by_education: Vec<(String, Vec<ExperienceBand>)>,
    /// Sorted distinct values per categorical feature, in feature order.
    pub choices:        Vec<(CategoricalFeature, Vec<String>)>,
    salaries:           Vec<f64>,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let salaries = dataset.targets();

        let mut by_job: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for r in dataset.iter() {
            if let (Some(job), Some(salary)) = (r.job_title.as_deref(), r.salary.filter(|s| s.is_finite())) {
                let entry = by_job.entry(job).or_insert((0.0, 0));
                entry.0 += salary;
                entry.1 += 1;
            }
        }
        let mut average_by_job: Vec<(String, f64)> = by_job
            .into_iter()
            .map(|(job, (sum, n))| (job.to_string(), sum / n as f64))
            .collect();
        // Stable sort keeps equal averages in title order
        average_by_job.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut by_education: BTreeMap<&str, BTreeMap<u32, (f64, usize)>> = BTreeMap::new();
        for r in dataset.iter() {
            let (Some(level), Some(years), Some(salary)) = (
                r.education_level.as_deref(),
                r.years_experience.filter(|y| y.is_finite() && *y >= 0.0),
                r.salary.filter(|s| s.is_finite()),
            ) else {
                continue;
            };
            let band  = (years / EXPERIENCE_BAND_YEARS).floor() as u32;
            let entry = by_education.entry(level).or_default().entry(band).or_insert((0.0, 0));
            entry.0 += salary;
            entry.1 += 1;
        }
        let experience_by_education = by_education
            .into_iter()
            .map(|(level, bands)| {
                let bands = bands
                    .into_iter()
                    .map(|(band, (sum, n))| ExperienceBand {
                        from_years:  band as f64 * EXPERIENCE_BAND_YEARS,
                        to_years:    (band + 1) as f64 * EXPERIENCE_BAND_YEARS,
                        mean_salary: sum / n as f64,
                        count:       n,
                    })
                    .collect();
                (level.to_string(), bands)
            })
            .collect();

        let choices = CategoricalFeature::ORDER
            .iter()
            .map(|&feature| {
                let mut values: Vec<String> = dataset
                    .iter()
                    .filter_map(|r| r.categorical(feature))
                    .map(str::to_string)
                    .collect();
                values.sort();
                values.dedup();
                (feature, values)
            })
            .collect();

        Self {
            n_records:     dataset.len(),
            n_with_salary: salaries.len(),
            histogram:     Histogram::build(&salaries, HISTOGRAM_BINS),
            average_by_job,
            experience_by_education,
            choices,
            salaries,
        }
    }

    /// Share of dataset salaries at or below `salary`, in percent.
    pub fn percentile_of(&self, salary: f64) -> Option<f64> {
        if self.salaries.is_empty() {
            return None;
        }
        let at_or_below = self.salaries.iter().filter(|&&s| s <= salary).count();
        Some(100.0 * at_or_below as f64 / self.salaries.len() as f64)
    }

    pub fn choices_for(&self, feature: CategoricalFeature) -> &[String] {
        self.choices
            .iter()
            .find(|(f, _)| *f == feature)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }
}

pub struct StatsUseCase {
    dataset_path: String,
}

impl StatsUseCase {
    pub fn new(dataset_path: impl Into<String>) -> Self {
        Self { dataset_path: dataset_path.into() }
    }

    pub fn execute(&self) -> Result<DatasetSummary> {
        let dataset = CsvLoader::new(&self.dataset_path).load()?;
        let summary = DatasetSummary::from_dataset(&dataset);
        tracing::info!(
            "Summarised {} records ({} with a salary, {} job titles)",
            summary.n_records,
            summary.n_with_salary,
            summary.average_by_job.len()
        );
        Ok(summary)
    }
}

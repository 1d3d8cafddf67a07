// ============================================================
// Layer 5 — Training Run
// ============================================================
// One full training run, without touching the file system:
//
//   Step 1: Drop records with no salary, reject degenerate data
//   Step 2: Seeded train / holdout split
//   Step 3: Fit the EncodingScheme on the training partition
//   Step 4: Encode both partitions with that scheme
//   Step 5: Fit the random forest on the training partition
//   Step 6: Score the holdout
//
// Persisting the result is the use case's job, so every
// degenerate-data check has already passed before anything
// is written.

use anyhow::Result;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    dataset::Dataset,
    encoding::EncodingScheme,
    preprocessor::Preprocessor,
    splitter::split_holdout,
};
use crate::domain::error::PipelineError;
use crate::domain::record::EmployeeRecord;
use crate::infra::metrics::HoldoutMetrics;
use crate::ml::forest::RandomForestRegressor;
use crate::ml::model::SalaryModel;
use crate::ml::regressor::Regressor;

/// Fewest labelled records a run will accept.
pub const MIN_TRAINING_RECORDS: usize = 2;

/// Summary of a run, for logging and the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub loaded:            usize,
    pub dropped_no_salary: usize,
    pub n_train:           usize,
    pub n_holdout:         usize,
    pub holdout:           Option<HoldoutMetrics>,
    /// Most important encoded columns, highest first.
    pub top_features:      Vec<(String, f64)>,
}

#[derive(Debug)]
pub struct TrainOutcome {
    pub model:  SalaryModel,
    pub scheme: EncodingScheme,
    pub report: TrainReport,
}

pub fn train(dataset: &Dataset, cfg: &TrainConfig) -> Result<TrainOutcome> {
    cfg.validate()?;

    // ── Step 1: Keep only labelled records ───────────────────────────────────
    let labelled = dataset.with_target();
    let dropped  = dataset.len() - labelled.len();
    if dropped > 0 {
        tracing::warn!("Dropped {} record(s) without a salary", dropped);
    }
    if labelled.len() < MIN_TRAINING_RECORDS {
        return Err(PipelineError::DegenerateData(format!(
            "{} record(s) with a salary; at least {} are needed",
            labelled.len(),
            MIN_TRAINING_RECORDS
        ))
        .into());
    }
    ensure_target_varies(&labelled.targets(), "dataset")?;

    // ── Step 2: Train / holdout split ────────────────────────────────────────
    let (mut train_records, mut holdout_records) =
        split_holdout(labelled.into_records(), cfg.holdout_fraction, cfg.seed);
    while train_records.len() < MIN_TRAINING_RECORDS {
        match holdout_records.pop() {
            Some(r) => train_records.push(r),
            None => break,
        }
    }
    let train_set   = Dataset::new(train_records);
    let holdout_set = Dataset::new(holdout_records);
    ensure_target_varies(&train_set.targets(), "training partition")?;
    tracing::info!(
        "Split: {} train, {} holdout (seed {})",
        train_set.len(),
        holdout_set.len(),
        cfg.seed
    );

    // ── Step 3: Fit the encoder on the training partition only ───────────────
    let scheme = Preprocessor::new().fit(&train_set)?;

    // ── Step 4: Encode both partitions ───────────────────────────────────────
    let x_train = scheme.encode_all(train_set.records());
    let y_train = train_set.targets();

    // ── Step 5: Fit the forest ───────────────────────────────────────────────
    let params = cfg.forest_params();
    tracing::info!(
        "Fitting random forest: {} trees, max_depth {:?}, {} features",
        params.n_trees,
        params.tree.max_depth,
        x_train.ncols()
    );
    let forest = RandomForestRegressor::fit(x_train.view(), &y_train, &params)?;

    // ── Step 6: Score the holdout ────────────────────────────────────────────
    let holdout = score_holdout(&forest, &scheme, holdout_set.records());
    match &holdout {
        Some(m) => tracing::info!(
            "Holdout ({} rows): R² {} | MAE {:.2} | RMSE {:.2}",
            m.n_samples,
            m.r2.map(|r| format!("{r:.4}")).unwrap_or_else(|| "n/a".into()),
            m.mae,
            m.rmse
        ),
        None => tracing::info!("No holdout rows; skipping evaluation"),
    }

    let top_features = top_features(&forest, &scheme, 5);
    let model        = SalaryModel::new(&scheme, forest, train_set.len());

    let report = TrainReport {
        loaded:            dataset.len(),
        dropped_no_salary: dropped,
        n_train:           train_set.len(),
        n_holdout:         holdout_set.len(),
        holdout,
        top_features,
    };

    Ok(TrainOutcome { model, scheme, report })
}

fn ensure_target_varies(targets: &[f64], what: &str) -> Result<(), PipelineError> {
    let first = targets.first().copied().unwrap_or_default();
    if targets.iter().all(|&t| t == first) {
        return Err(PipelineError::DegenerateData(format!(
            "every salary in the {what} equals {first}; nothing to learn"
        )));
    }
    Ok(())
}

fn score_holdout(
    forest:  &RandomForestRegressor,
    scheme:  &EncodingScheme,
    records: &[EmployeeRecord],
) -> Option<HoldoutMetrics> {
    if records.is_empty() {
        return None;
    }
    let x         = scheme.encode_all(records);
    let predicted = forest.predict(x.view());
    let actual: Vec<f64> = records.iter().filter_map(|r| r.salary).collect();
    HoldoutMetrics::compute(&actual, &predicted)
}

fn top_features(forest: &RandomForestRegressor, scheme: &EncodingScheme, k: usize) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = scheme
        .column_names()
        .into_iter()
        .zip(forest.feature_importances())
        .filter(|(_, imp)| *imp > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);
    ranked
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::column::CategoricalFeature;

    fn toy() -> Dataset {
        Dataset::new(vec![
            EmployeeRecord::new(25.0, "M", "Bachelors", "Analyst", 2.0, 50000.0),
            EmployeeRecord::new(30.0, "F", "Masters", "Analyst", 5.0, 70000.0),
            EmployeeRecord::new(40.0, "M", "PhD", "Manager", 12.0, 110000.0),
            EmployeeRecord::new(22.0, "F", "Bachelors", "Analyst", 1.0, 45000.0),
        ])
    }

    fn full_fit_config() -> TrainConfig {
        TrainConfig { holdout_fraction: 0.0, ..TrainConfig::default() }
    }

    #[test]
    fn test_toy_dataset_column_counts() {
        let out = train(&toy(), &full_fit_config()).unwrap();
        assert_eq!(out.scheme.vocabulary(CategoricalFeature::Gender).len(), 2);
        assert_eq!(out.scheme.vocabulary(CategoricalFeature::EducationLevel).len(), 3);
        assert_eq!(out.scheme.vocabulary(CategoricalFeature::JobTitle).len(), 2);
        assert_eq!(out.model.n_features, out.scheme.width());
        assert_eq!(out.model.scheme_fingerprint, out.scheme.fingerprint());
        assert_eq!(out.report.n_train, 4);
        assert!(out.report.holdout.is_none());
    }

    #[test]
    fn test_training_is_reproducible() {
        let a = train(&toy(), &full_fit_config()).unwrap();
        let b = train(&toy(), &full_fit_config()).unwrap();
        assert_eq!(a.model, b.model);
        assert_eq!(a.scheme, b.scheme);
    }

    #[test]
    fn test_holdout_is_scored() {
        let records: Vec<EmployeeRecord> = (0..30)
            .map(|i| {
                let job = if i % 3 == 0 { "Manager" } else { "Analyst" };
                EmployeeRecord::new(22.0 + i as f64, "F", "Bachelors", job, i as f64, 40000.0 + 2000.0 * i as f64)
            })
            .collect();
        let out = train(&Dataset::new(records), &TrainConfig::default()).unwrap();
        assert_eq!(out.report.n_train, 24);
        assert_eq!(out.report.n_holdout, 6);
        let m = out.report.holdout.unwrap();
        assert_eq!(m.n_samples, 6);
        assert!(m.mae < 20000.0);
        assert!(!out.report.top_features.is_empty());
    }

    #[test]
    fn test_too_few_records_is_degenerate() {
        let ds  = Dataset::new(vec![EmployeeRecord::new(25.0, "M", "Bachelors", "Analyst", 2.0, 50000.0)]);
        let err = train(&ds, &TrainConfig::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::DegenerateData(_))));
    }

    #[test]
    fn test_constant_salary_is_degenerate() {
        let ds = Dataset::new(vec![
            EmployeeRecord::new(25.0, "M", "Bachelors", "Analyst", 2.0, 50000.0),
            EmployeeRecord::new(35.0, "F", "PhD", "Manager", 9.0, 50000.0),
        ]);
        let err = train(&ds, &TrainConfig::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::DegenerateData(_))));
    }

    #[test]
    fn test_records_without_salary_are_dropped() {
        let mut records = toy().into_records();
        let mut unlabelled = EmployeeRecord::new(50.0, "M", "PhD", "Director", 20.0, 0.0);
        unlabelled.salary = None;
        records.push(unlabelled);

        let out = train(&Dataset::new(records), &full_fit_config()).unwrap();
        assert_eq!(out.report.loaded, 5);
        assert_eq!(out.report.dropped_no_salary, 1);
        assert!(!out.scheme.vocabulary(CategoricalFeature::JobTitle).contains(&"Director".to_string()));
    }

    #[test]
    fn test_holdout_only_category_stays_out_of_encoder() {
        use crate::data::preprocessor::tests::{records_with_one_director, seed_holding_out_director};

        let cfg = TrainConfig { seed: seed_holding_out_director(), n_trees: 10, ..TrainConfig::default() };
        let out = train(&Dataset::new(records_with_one_director()), &cfg).unwrap();

        assert_eq!(out.report.n_holdout, 4);
        assert_eq!(out.scheme.vocabulary(CategoricalFeature::JobTitle), &["Analyst"]);
        assert_eq!(out.model.n_features, 2 + 1 + 1 + 1);
        assert!(out.report.holdout.is_some());
    }

    #[test]
    fn test_two_records_keep_both_for_training() {
        let ds = Dataset::new(vec![
            EmployeeRecord::new(25.0, "M", "Bachelors", "Analyst", 2.0, 50000.0),
            EmployeeRecord::new(40.0, "F", "PhD", "Manager", 12.0, 110000.0),
        ]);
        let cfg = TrainConfig { holdout_fraction: 0.5, ..TrainConfig::default() };
        let out = train(&ds, &cfg).unwrap();
        assert_eq!(out.report.n_train, 2);
        assert_eq!(out.report.n_holdout, 0);
    }
}

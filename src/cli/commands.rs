// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `predict` and `stats`
// and all their configurable flags.
//
// clap's derive macros generate help text, error messages for
// bad values and the string → number conversions.

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::domain::record::SalaryQuery;
use crate::ml::tree::MaxFeatures;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the salary model on an employee CSV
    Train(TrainArgs),

    /// Predict a salary with a trained model
    Predict(PredictArgs),

    /// Summarise the salaries in a dataset
    Stats(StatsArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV file with Age, Gender, Education Level, Job Title,
    /// Years of Experience and Salary columns
    #[arg(long, default_value = "data/employee_data.csv")]
    pub dataset: String,

    /// Directory for encoder.json, salary_model.json and metrics.csv
    #[arg(long, default_value = "model")]
    pub artifact_dir: String,

    /// Share of records withheld for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub holdout_fraction: f64,

    /// Seed for the split and the forest
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    pub n_trees: usize,

    /// Maximum tree depth (unlimited when omitted)
    #[arg(long)]
    pub max_depth: Option<usize>,

    #[arg(long, default_value_t = 2)]
    pub min_samples_split: usize,

    #[arg(long, default_value_t = 1)]
    pub min_samples_leaf: usize,

    /// Features tried per split: "all", "sqrt" or a fraction like 0.5
    #[arg(long, default_value = "all", value_parser = parse_max_features)]
    pub max_features: MaxFeatures,

    /// Fit every tree on the full training partition
    #[arg(long)]
    pub no_bootstrap: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            dataset_path:      a.dataset,
            artifact_dir:      a.artifact_dir,
            holdout_fraction:  a.holdout_fraction,
            seed:              a.seed,
            n_trees:           a.n_trees,
            max_depth:         a.max_depth,
            min_samples_split: a.min_samples_split,
            min_samples_leaf:  a.min_samples_leaf,
            max_features:      a.max_features,
            bootstrap:         !a.no_bootstrap,
        }
    }
}

fn parse_max_features(raw: &str) -> Result<MaxFeatures, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "all"  => Ok(MaxFeatures::All),
        "sqrt" => Ok(MaxFeatures::Sqrt),
        other  => other
            .parse::<f64>()
            .map(MaxFeatures::Fraction)
            .map_err(|_| format!("expected 'all', 'sqrt' or a fraction, got '{raw}'")),
    }
}

/// All arguments for the `predict` command.
/// Any input left out is filled in from the training data.
#[derive(Args, Debug)]
pub struct PredictArgs {
    #[arg(long)]
    pub age: Option<f64>,

    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long)]
    pub education_level: Option<String>,

    #[arg(long)]
    pub job_title: Option<String>,

    #[arg(long)]
    pub years_experience: Option<f64>,

    /// Directory written by `train`
    #[arg(long, default_value = "model")]
    pub artifact_dir: String,

    /// Dataset to rank the prediction against
    #[arg(long)]
    pub dataset: Option<String>,

    /// Print the prediction as JSON
    #[arg(long)]
    pub json: bool,
}

impl PredictArgs {
    pub fn query(&self) -> SalaryQuery {
        SalaryQuery {
            age:              self.age,
            gender:           self.gender.clone(),
            education_level:  self.education_level.clone(),
            job_title:        self.job_title.clone(),
            years_experience: self.years_experience,
        }
    }
}

/// All arguments for the `stats` command
#[derive(Args, Debug)]
pub struct StatsArgs {
    #[arg(long, default_value = "data/employee_data.csv")]
    pub dataset: String,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_args_into_config() {
        let cli = Cli::try_parse_from([
            "salary-predictor", "train", "--dataset", "x.csv", "--n-trees", "10",
            "--max-features", "sqrt", "--no-bootstrap",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.dataset_path, "x.csv");
        assert_eq!(cfg.n_trees, 10);
        assert_eq!(cfg.max_features, MaxFeatures::Sqrt);
        assert!(!cfg.bootstrap);
        assert_eq!(cfg.seed, 42);
    }

    #[test]
    fn test_predict_args_allow_missing_inputs() {
        let cli = Cli::try_parse_from(["salary-predictor", "predict", "--job-title", "Analyst"]).unwrap();
        let Commands::Predict(args) = cli.command else { panic!("expected predict") };
        let q = args.query();
        assert_eq!(q.job_title.as_deref(), Some("Analyst"));
        assert!(q.age.is_none());
    }

    #[test]
    fn test_parse_max_features() {
        assert_eq!(parse_max_features("0.5"), Ok(MaxFeatures::Fraction(0.5)));
        assert_eq!(parse_max_features("ALL"), Ok(MaxFeatures::All));
        assert!(parse_max_features("half").is_err());
    }
}

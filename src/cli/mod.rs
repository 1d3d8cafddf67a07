// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train`   — fits encoder + forest on an employee CSV
//   2. `predict` — loads the artifacts and predicts one salary
//   3. `stats`   — prints salary statistics for a dataset

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, StatsArgs, TrainArgs};

use crate::domain::column::CategoricalFeature;
use crate::domain::prediction::Prediction;

#[derive(Parser, Debug)]
#[command(
    name = "salary-predictor",
    version = "0.1.0",
    about = "Train a random forest on employee records, then predict salaries."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the matching use case. Never computes anything itself.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
            Commands::Stats(args)   => run_stats(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on: {}", args.dataset);
    let artifact_dir = args.artifact_dir.clone();
    let report = TrainUseCase::new(args.into()).execute()?;

    println!("Training complete. Artifacts saved to '{artifact_dir}'.");
    println!("  records loaded : {}", report.loaded);
    println!("  without salary : {}", report.dropped_no_salary);
    println!("  train / holdout: {} / {}", report.n_train, report.n_holdout);
    if let Some(m) = &report.holdout {
        let r2 = m.r2.map(|r| format!("{r:.4}")).unwrap_or_else(|| "n/a".into());
        println!("  holdout R²     : {r2}");
        println!("  holdout MAE    : {}", format_salary(m.mae));
        println!("  holdout RMSE   : {}", format_salary(m.rmse));
    }
    if !report.top_features.is_empty() {
        println!("  top features:");
        for (name, importance) in &report.top_features {
            println!("    {name:<40} {importance:.4}");
        }
    }
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;
    use crate::application::stats_use_case::StatsUseCase;

    let use_case   = PredictUseCase::new(&args.artifact_dir)?;
    let prediction = use_case.predict(&args.query());

    let percentile = match &args.dataset {
        Some(path) => StatsUseCase::new(path.as_str())
            .execute()?
            .percentile_of(prediction.predicted_salary),
        None => None,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&json_view(&prediction, percentile))?);
        return Ok(());
    }

    println!("\nPredicted Salary: {}", format_salary(prediction.predicted_salary));
    println!("{}", prediction.bracket().caption());
    if let Some(p) = percentile {
        println!("Higher than or equal to {p:.1}% of salaries in the dataset.");
    }
    for w in &prediction.validation_warnings {
        println!("warning: {w}");
    }
    for w in &prediction.encoding_warnings {
        println!("note: {w}");
    }
    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<()> {
    use crate::application::stats_use_case::StatsUseCase;

    let summary = StatsUseCase::new(args.dataset.as_str()).execute()?;

    println!("Records: {} ({} with a salary)", summary.n_records, summary.n_with_salary);

    if let Some(h) = &summary.histogram {
        println!("\nSalary distribution:");
        let peak = h.counts.iter().copied().max().unwrap_or(0).max(1);
        for (i, count) in h.counts.iter().enumerate() {
            let bar = "#".repeat(count * 40 / peak);
            println!(
                "  {:>13} - {:>13} | {:>5} {}",
                format_salary(h.edges[i]),
                format_salary(h.edges[i + 1]),
                count,
                bar
            );
        }
    }

    println!("\nAverage salary by job title:");
    for (job, avg) in &summary.average_by_job {
        println!("  {job:<40} {}", format_salary(*avg));
    }

    println!("\nAverage salary by years of experience:");
    for (level, bands) in &summary.experience_by_education {
        println!("  {level}");
        for band in bands {
            println!(
                "    {:>4}-{:<4} yrs {:>13} ({} records)",
                band.from_years,
                band.to_years,
                format_salary(band.mean_salary),
                band.count
            );
        }
    }

    println!("\nChoices:");
    for feature in CategoricalFeature::ORDER {
        println!("  {feature}: {}", summary.choices_for(feature).join(", "));
    }
    Ok(())
}

fn json_view(prediction: &Prediction, percentile: Option<f64>) -> serde_json::Value {
    let warnings: Vec<String> = prediction
        .validation_warnings
        .iter()
        .map(ToString::to_string)
        .chain(prediction.encoding_warnings.iter().map(ToString::to_string))
        .collect();

    let mut view = serde_json::json!({
        "predicted_salary": prediction.predicted_salary,
        "bracket":          prediction.bracket(),
        "warnings":         warnings,
    });
    if let Some(p) = percentile {
        view["percentile"] = serde_json::json!(p);
    }
    view
}

/// `$12,345.67` style formatting, rounded to cents.
pub fn format_salary(amount: f64) -> String {
    let cents    = (amount.abs() * 100.0).round() as u64;
    let whole    = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{fraction:02}")
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::warnings::ValidationWarning;
    use crate::domain::column::Column;

    #[test]
    fn test_format_salary() {
        assert_eq!(format_salary(12345.678), "$12,345.68");
        assert_eq!(format_salary(999.0), "$999.00");
        assert_eq!(format_salary(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_salary(0.0), "$0.00");
        assert_eq!(format_salary(-1500.5), "-$1,500.50");
    }

    #[test]
    fn test_json_view_shape() {
        let prediction = Prediction {
            predicted_salary:    120000.0,
            encoding_warnings:   Vec::new(),
            validation_warnings: vec![ValidationWarning::OutOfRange {
                column: Column::Age,
                value:  70.0,
                min:    18.0,
                max:    65.0,
            }],
        };
        let view = json_view(&prediction, None);
        assert_eq!(view["predicted_salary"], 120000.0);
        assert_eq!(view["bracket"], "top");
        assert_eq!(view["warnings"].as_array().unwrap().len(), 1);
        assert!(view.get("percentile").is_none());
    }
}

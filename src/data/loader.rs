// ============================================================
// Layer 4 — Dataset Loader
// ============================================================
// Loads the employee CSV into typed EmployeeRecords using the
// csv crate.
//
// Expected header (column order is free, extra columns are
// ignored):
//
//   Age,Gender,Education Level,Job Title,Years of Experience,Salary
//
// Every cell that matches a missing marker ("", "NA", "NaN",
// ...) becomes `None`. Categorical text is passed through
// unchanged; no cleaning happens here.
//
// Failure policy:
//   - missing file, missing header, ragged row,
//     non-numeric Age / Years of Experience  → DataAccess error
//   - non-numeric Salary                     → None (the record
//                                              is dropped later
//                                              when training)

use anyhow::Result;
use csv::{ReaderBuilder, StringRecord};
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use crate::data::dataset::Dataset;
use crate::domain::column::Column;
use crate::domain::error::PipelineError;
use crate::domain::record::EmployeeRecord;
use crate::domain::traits::RecordSource;

/// Cell values treated as "missing".
pub const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Loads a CSV file of employee records.
/// Implements the RecordSource trait from Layer 3.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

}

impl RecordSource for CsvLoader {
    fn load(&self) -> Result<Dataset> {
        Ok(load_csv(&self.path)?)
    }
}

/// Read the dataset at `path`.
pub fn load_csv(path: &Path) -> Result<Dataset, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::data_access(path, "file does not exist"));
    }

    let file = File::open(path)
        .map_err(|e| PipelineError::data_access(path, e.to_string()))?;

    let dataset = read_records(file)
        .map_err(|reason| PipelineError::data_access(path, reason))?;

    tracing::info!("Loaded {} records from '{}'", dataset.len(), path.display());
    for column in Column::ALL {
        let values  = dataset.column(column);
        let missing = values.missing_count();
        if missing > 0 {
            tracing::debug!("{}: {} of {} values missing", column, missing, values.len());
        }
    }
    Ok(dataset)
}

/// Parse CSV text from any reader. Errors are plain messages;
/// the caller attaches the source path.
pub fn read_records<R: Read>(reader: R) -> Result<Dataset, String> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| format!("unreadable header: {e}"))?.clone();
    let layout  = HeaderLayout::resolve(&headers)?;

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        // Header is line 1
        let line = i + 2;
        let row  = row.map_err(|e| format!("line {line}: {e}"))?;
        records.push(layout.parse_row(&row, line)?);
    }

    Ok(Dataset::new(records))
}

// ─── Header Layout ────────────────────────────────────────────────────────────
/// Position of each required column inside a CSV row.
struct HeaderLayout {
    age:              usize,
    gender:           usize,
    education_level:  usize,
    job_title:        usize,
    years_experience: usize,
    salary:           usize,
}

impl HeaderLayout {
    fn resolve(headers: &StringRecord) -> Result<Self, String> {
        let find = |column: Column| {
            headers.iter().position(|h| Column::from_header(h) == Some(column))
        };

        let missing: Vec<&str> = Column::ALL
            .iter()
            .filter(|c| find(**c).is_none())
            .map(|c| c.header())
            .collect();
        if !missing.is_empty() {
            return Err(format!("missing required column(s): {}", missing.join(", ")));
        }

        // All present, checked above
        let at = |column: Column| find(column).unwrap_or_default();
        Ok(Self {
            age:              at(Column::Age),
            gender:           at(Column::Gender),
            education_level:  at(Column::EducationLevel),
            job_title:        at(Column::JobTitle),
            years_experience: at(Column::YearsExperience),
            salary:           at(Column::Salary),
        })
    }

    fn parse_row(&self, row: &StringRecord, line: usize) -> Result<EmployeeRecord, String> {
        let cell = |idx: usize| row.get(idx).unwrap_or("");

        let salary = match parse_number(cell(self.salary)) {
            Ok(v) => v,
            Err(raw) => {
                tracing::warn!("line {}: unparsable Salary '{}' treated as missing", line, raw);
                None
            }
        };

        Ok(EmployeeRecord {
            age:              parse_feature(cell(self.age), Column::Age, line)?,
            gender:           parse_category(cell(self.gender)),
            education_level:  parse_category(cell(self.education_level)),
            job_title:        parse_category(cell(self.job_title)),
            years_experience: parse_feature(cell(self.years_experience), Column::YearsExperience, line)?,
            salary,
        })
    }
}

pub fn is_missing(raw: &str) -> bool {
    MISSING_MARKERS.contains(&raw.trim())
}

/// `Ok(None)` for a missing marker, `Err(raw)` for anything that is not a finite number.
fn parse_number(raw: &str) -> Result<Option<f64>, String> {
    if is_missing(raw) {
        return Ok(None);
    }
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(raw.to_string()),
    }
}

fn parse_feature(raw: &str, column: Column, line: usize) -> Result<Option<f64>, String> {
    parse_number(raw).map_err(|raw| format!("line {line}: {column} '{raw}' is not a number"))
}

fn parse_category(raw: &str) -> Option<String> {
    if is_missing(raw) { None } else { Some(raw.to_string()) }
}

use serde::{Deserialize, Serialize};

use crate::domain::column::{CategoricalFeature, Column, NumericFeature};
use crate::domain::record::EmployeeRecord;

/// One column of the dataset, typed by what the column holds.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues<'a> {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<&'a str>>),
}

impl ColumnValues<'_> {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v)     => v.len(),
            ColumnValues::Categorical(v) => v.len(),
        }
    }

    pub fn missing_count(&self) -> usize {
        match self {
            ColumnValues::Numeric(v)     => v.iter().filter(|x| x.is_none()).count(),
            ColumnValues::Categorical(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }
}

/// An ordered, read-only collection of employee records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<EmployeeRecord>,
}

impl Dataset {
    pub fn new(records: Vec<EmployeeRecord>) -> Self { Self { records } }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn records(&self) -> &[EmployeeRecord] { &self.records }

    pub fn iter(&self) -> std::slice::Iter<'_, EmployeeRecord> { self.records.iter() }

    pub fn into_records(self) -> Vec<EmployeeRecord> { self.records }

    /// Column access by name.
    pub fn column(&self, column: Column) -> ColumnValues<'_> {
        match column {
            Column::Age             => ColumnValues::Numeric(self.numeric(NumericFeature::Age)),
            Column::YearsExperience => ColumnValues::Numeric(self.numeric(NumericFeature::YearsExperience)),
            Column::Salary          => ColumnValues::Numeric(self.records.iter().map(|r| r.salary).collect()),
            Column::Gender          => ColumnValues::Categorical(self.categorical(CategoricalFeature::Gender)),
            Column::EducationLevel  => ColumnValues::Categorical(self.categorical(CategoricalFeature::EducationLevel)),
            Column::JobTitle        => ColumnValues::Categorical(self.categorical(CategoricalFeature::JobTitle)),
        }
    }

    fn numeric(&self, feature: NumericFeature) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.numeric(feature)).collect()
    }

    fn categorical(&self, feature: CategoricalFeature) -> Vec<Option<&str>> {
        self.records.iter().map(|r| r.categorical(feature)).collect()
    }

    /// Copy of the dataset without records that lack a usable salary.
    pub fn with_target(&self) -> Dataset {
        Dataset::new(self.records.iter().filter(|r| r.has_target()).cloned().collect())
    }

    /// Salaries of every record that has one, in record order.
    pub fn targets(&self) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.salary.filter(|s| s.is_finite())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let mut missing = EmployeeRecord::new(40.0, "M", "PhD", "Manager", 12.0, 0.0);
        missing.salary = None;
        missing.gender = None;
        Dataset::new(vec![
            EmployeeRecord::new(25.0, "M", "Bachelors", "Analyst", 2.0, 50000.0),
            missing,
        ])
    }

    #[test]
    fn test_typed_column_access() {
        let ds = sample();
        let gender = ds.column(Column::Gender);
        assert_eq!(gender, ColumnValues::Categorical(vec![Some("M"), None]));
        assert_eq!(gender.missing_count(), 1);

        let salary = ds.column(Column::Salary);
        assert_eq!(salary, ColumnValues::Numeric(vec![Some(50000.0), None]));
        assert_eq!(salary.len(), 2);
    }

    #[test]
    fn test_with_target_drops_missing_salary() {
        let ds = sample();
        assert_eq!(ds.with_target().len(), 1);
        assert_eq!(ds.targets(), vec![50000.0]);
    }
}

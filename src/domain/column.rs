// ============================================================
// Layer 3 — Dataset Columns
// ============================================================
// The six columns of the employee dataset, with the exact
// header text used in the CSV file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every column the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    Age,
    Gender,
    EducationLevel,
    JobTitle,
    YearsExperience,
    Salary,
}

impl Column {
    /// All columns in dataset header order.
    pub const ALL: [Column; 6] = [
        Column::Age,
        Column::Gender,
        Column::EducationLevel,
        Column::JobTitle,
        Column::YearsExperience,
        Column::Salary,
    ];

    /// Header text as it appears in the CSV file
    pub fn header(self) -> &'static str {
        match self {
            Column::Age             => "Age",
            Column::Gender          => "Gender",
            Column::EducationLevel  => "Education Level",
            Column::JobTitle        => "Job Title",
            Column::YearsExperience => "Years of Experience",
            Column::Salary          => "Salary",
        }
    }

    /// Column named by a CSV header, ignoring surrounding whitespace.
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL.into_iter().find(|c| c.header() == header)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// The three one-hot encoded features, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoricalFeature {
    Gender,
    EducationLevel,
    JobTitle,
}

impl CategoricalFeature {
    /// Indicator blocks are laid out in exactly this order.
    pub const ORDER: [CategoricalFeature; 3] = [
        CategoricalFeature::Gender,
        CategoricalFeature::EducationLevel,
        CategoricalFeature::JobTitle,
    ];

    pub fn column(self) -> Column {
        match self {
            CategoricalFeature::Gender         => Column::Gender,
            CategoricalFeature::EducationLevel => Column::EducationLevel,
            CategoricalFeature::JobTitle       => Column::JobTitle,
        }
    }
}

impl fmt::Display for CategoricalFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.column().fmt(f)
    }
}

/// The two numeric inputs that lead every feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericFeature {
    Age,
    YearsExperience,
}

impl NumericFeature {
    pub const ORDER: [NumericFeature; 2] = [NumericFeature::Age, NumericFeature::YearsExperience];

    pub fn column(self) -> Column {
        match self {
            NumericFeature::Age             => Column::Age,
            NumericFeature::YearsExperience => Column::YearsExperience,
        }
    }
}

impl fmt::Display for NumericFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.column().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header() {
        assert_eq!(Column::from_header(" Years of Experience "), Some(Column::YearsExperience));
        assert_eq!(Column::from_header("salary"), None);
        for c in Column::ALL {
            assert_eq!(Column::from_header(c.header()), Some(c));
        }
    }

    #[test]
    fn test_headers_match_dataset() {
        let headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
        assert_eq!(
            headers,
            vec!["Age", "Gender", "Education Level", "Job Title", "Years of Experience", "Salary"]
        );
    }

    #[test]
    fn test_features_map_to_columns() {
        assert_eq!(NumericFeature::YearsExperience.column(), Column::YearsExperience);
        assert_eq!(CategoricalFeature::EducationLevel.column(), Column::EducationLevel);
        assert_eq!(CategoricalFeature::JobTitle.to_string(), "Job Title");
    }
}

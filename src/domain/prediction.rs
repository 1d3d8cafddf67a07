use serde::{Deserialize, Serialize};

use crate::domain::warnings::{EncodingWarning, ValidationWarning};

/// Salary above which a prediction counts as top bracket.
pub const TOP_BRACKET_THRESHOLD: f64 = 100_000.0;

/// The answer to one SalaryQuery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_salary:    f64,
    pub encoding_warnings:   Vec<EncodingWarning>,
    pub validation_warnings: Vec<ValidationWarning>,
}

impl Prediction {
    pub fn has_warnings(&self) -> bool {
        !self.encoding_warnings.is_empty() || !self.validation_warnings.is_empty()
    }

    pub fn bracket(&self) -> SalaryBracket {
        if self.predicted_salary > TOP_BRACKET_THRESHOLD {
            SalaryBracket::Top
        } else {
            SalaryBracket::Growing
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryBracket {
    Top,
    Growing,
}

impl SalaryBracket {
    pub fn caption(self) -> &'static str {
        match self {
            SalaryBracket::Top     => "You're in the top bracket!",
            SalaryBracket::Growing => "Growing strong!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_threshold() {
        let mut p = Prediction {
            predicted_salary:    100_000.0,
            encoding_warnings:   Vec::new(),
            validation_warnings: Vec::new(),
        };
        assert_eq!(p.bracket(), SalaryBracket::Growing);
        p.predicted_salary = 100_000.01;
        assert_eq!(p.bracket(), SalaryBracket::Top);
        assert!(!p.has_warnings());
    }
}

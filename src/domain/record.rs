// ============================================================
// Layer 3 — EmployeeRecord / SalaryQuery
// ============================================================
// EmployeeRecord is one row of the dataset after it has been
// validated at the CSV boundary. Every field is optional
// because the dataset may contain missing markers anywhere;
// `None` is the single representation of "missing".
//
// SalaryQuery is one prediction request. It converts into an
// EmployeeRecord with no salary so that training and inference
// share exactly one encoding path.

use serde::{Deserialize, Serialize};

use crate::domain::column::{CategoricalFeature, NumericFeature};

/// One employee row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub age:              Option<f64>,
    pub gender:           Option<String>,
    pub education_level:  Option<String>,
    pub job_title:        Option<String>,
    pub years_experience: Option<f64>,
    /// Training target. Records without it never reach the model.
    pub salary:           Option<f64>,
}

impl EmployeeRecord {
    /// Fully populated record for fixtures.
    #[cfg(test)]
    pub fn new(
        age:              f64,
        gender:           impl Into<String>,
        education_level:  impl Into<String>,
        job_title:        impl Into<String>,
        years_experience: f64,
        salary:           f64,
    ) -> Self {
        Self {
            age:              Some(age),
            gender:           Some(gender.into()),
            education_level:  Some(education_level.into()),
            job_title:        Some(job_title.into()),
            years_experience: Some(years_experience),
            salary:           Some(salary),
        }
    }

    /// A record can be used for training only if its target is a real number.
    pub fn has_target(&self) -> bool {
        self.salary.map_or(false, f64::is_finite)
    }

    /// Numeric input by feature; non-finite values count as missing.
    pub fn numeric(&self, feature: NumericFeature) -> Option<f64> {
        let value = match feature {
            NumericFeature::Age             => self.age,
            NumericFeature::YearsExperience => self.years_experience,
        };
        value.filter(|v| v.is_finite())
    }

    pub fn categorical(&self, feature: CategoricalFeature) -> Option<&str> {
        match feature {
            CategoricalFeature::Gender         => self.gender.as_deref(),
            CategoricalFeature::EducationLevel => self.education_level.as_deref(),
            CategoricalFeature::JobTitle       => self.job_title.as_deref(),
        }
    }
}

/// One prediction request.
///
/// Numeric fields are optional so a caller can leave them out and
/// get the training-time median instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryQuery {
    pub age:              Option<f64>,
    pub gender:           Option<String>,
    pub education_level:  Option<String>,
    pub job_title:        Option<String>,
    pub years_experience: Option<f64>,
}

impl SalaryQuery {
    #[cfg(test)]
    pub fn new(
        age:              f64,
        gender:           impl Into<String>,
        education_level:  impl Into<String>,
        job_title:        impl Into<String>,
        years_experience: f64,
    ) -> Self {
        Self {
            age:              Some(age),
            gender:           Some(gender.into()),
            education_level:  Some(education_level.into()),
            job_title:        Some(job_title.into()),
            years_experience: Some(years_experience),
        }
    }
}

impl From<SalaryQuery> for EmployeeRecord {
    fn from(q: SalaryQuery) -> Self {
        EmployeeRecord {
            age:              q.age,
            gender:           q.gender,
            education_level:  q.education_level,
            job_title:        q.job_title,
            years_experience: q.years_experience,
            salary:           None,
        }
    }
}

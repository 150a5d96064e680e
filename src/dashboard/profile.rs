//! The prediction form: employee profile and its input options

use crate::error::{AttritionError, Result};
use crate::utils;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Categorical fields offered as drop-downs, in form order
pub const FORM_CATEGORICALS: [&str; 7] = [
    "Department",
    "JobRole",
    "BusinessTravel",
    "EducationField",
    "Gender",
    "MaritalStatus",
    "OverTime",
];

/// Allowed range and initial value of a numeric form input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub field: String,
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

impl NumericRange {
    fn new(field: &str, min: i64, max: i64, default: i64) -> Self {
        Self {
            field: field.to_string(),
            min,
            max,
            default,
        }
    }

    fn check(&self, value: i64) -> Result<()> {
        if (self.min..=self.max).contains(&value) {
            Ok(())
        } else {
            Err(AttritionError::InvalidInput(format!(
                "{} must be between {} and {}, got {}",
                self.field, self.min, self.max, value
            )))
        }
    }
}

/// Numeric inputs of the prediction form
pub fn numeric_ranges() -> Vec<NumericRange> {
    vec![
        NumericRange::new("Age", 18, 60, 30),
        NumericRange::new("MonthlyIncome", 1000, 200_000, 50_000),
        NumericRange::new("YearsAtCompany", 0, 40, 3),
        NumericRange::new("WorkLifeBalance", 1, 4, 3),
        NumericRange::new("JobSatisfaction", 1, 4, 3),
    ]
}

/// One hypothetical employee, as entered in the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmployeeProfile {
    pub age: i64,
    pub monthly_income: i64,
    pub years_at_company: i64,
    pub work_life_balance: i64,
    pub job_satisfaction: i64,
    pub business_travel: String,
    pub department: String,
    pub education_field: String,
    pub gender: String,
    pub job_role: String,
    pub marital_status: String,
    pub over_time: String,
}

impl EmployeeProfile {
    /// Reject numeric values outside the form ranges
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.age,
            self.monthly_income,
            self.years_at_company,
            self.work_life_balance,
            self.job_satisfaction,
        ];
        for (range, value) in numeric_ranges().iter().zip(values) {
            range.check(value)?;
        }
        Ok(())
    }

    /// Single-row frame with the twelve feature columns
    pub fn to_frame(&self) -> Result<DataFrame> {
        let df = df!(
            "Age" => [self.age],
            "MonthlyIncome" => [self.monthly_income],
            "YearsAtCompany" => [self.years_at_company],
            "WorkLifeBalance" => [self.work_life_balance],
            "JobSatisfaction" => [self.job_satisfaction],
            "BusinessTravel" => [self.business_travel.as_str()],
            "Department" => [self.department.as_str()],
            "EducationField" => [self.education_field.as_str()],
            "Gender" => [self.gender.as_str()],
            "JobRole" => [self.job_role.as_str()],
            "MaritalStatus" => [self.marital_status.as_str()],
            "OverTime" => [self.over_time.as_str()],
        )?;
        Ok(df)
    }
}

/// Values the prediction form offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormOptions {
    /// Distinct values per categorical field, in order of first appearance
    pub categorical: Vec<(String, Vec<String>)>,
    pub numeric: Vec<NumericRange>,
}

impl FormOptions {
    /// Collect drop-down values from the cleaned table
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let categorical = FORM_CATEGORICALS
            .iter()
            .map(|col| Ok((col.to_string(), unique_in_order(df, col)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            categorical,
            numeric: numeric_ranges(),
        })
    }

    pub fn values(&self, field: &str) -> Option<&[String]> {
        self.categorical
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, values)| values.as_slice())
    }
}

fn unique_in_order(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    Ok(utils::column_str(df, column)?
        .into_iter()
        .flatten()
        .filter(|v| seen.insert(v.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> EmployeeProfile {
        EmployeeProfile {
            age: 30,
            monthly_income: 50_000,
            years_at_company: 3,
            work_life_balance: 3,
            job_satisfaction: 3,
            business_travel: "Travel_Rarely".to_string(),
            department: "Sales".to_string(),
            education_field: "Marketing".to_string(),
            gender: "Female".to_string(),
            job_role: "Sales Executive".to_string(),
            marital_status: "Single".to_string(),
            over_time: "Yes".to_string(),
        }
    }

    #[test]
    fn test_validate_ranges() {
        assert!(profile().validate().is_ok());

        let mut young = profile();
        young.age = 17;
        assert!(matches!(young.validate(), Err(AttritionError::InvalidInput(_))));

        let mut unhappy = profile();
        unhappy.job_satisfaction = 5;
        assert!(unhappy.validate().is_err());

        let mut edge = profile();
        edge.monthly_income = 200_000;
        edge.years_at_company = 0;
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_to_frame() {
        let df = profile().to_frame().unwrap();
        assert_eq!(df.shape(), (1, 12));
        assert_eq!(
            df.column("OverTime").unwrap().str().unwrap().get(0),
            Some("Yes")
        );
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(profile()).unwrap();
        assert_eq!(json["MonthlyIncome"], 50_000);
        assert_eq!(json["OverTime"], "Yes");
    }

    #[test]
    fn test_options_first_appearance() {
        let df = df!(
            "Department" => &["Sales", "R&D", "Sales", "HR"],
            "JobRole" => &["a", "b", "c", "d"],
            "BusinessTravel" => &["x", "x", "x", "x"],
            "EducationField" => &["x", "x", "x", "x"],
            "Gender" => &["Male", "Female", "Male", "Male"],
            "MaritalStatus" => &["x", "x", "x", "x"],
            "OverTime" => &["No", "Yes", "No", "No"],
        )
        .unwrap();

        let options = FormOptions::from_frame(&df).unwrap();
        assert_eq!(options.values("Department").unwrap(), &["Sales", "R&D", "HR"]);
        assert_eq!(options.values("OverTime").unwrap(), &["No", "Yes"]);
        assert_eq!(options.numeric.len(), 5);
    }
}

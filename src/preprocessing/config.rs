//! Cleaning configuration

use serde::{Deserialize, Serialize};

/// Columns dropped from the raw export: organisation-wide constants and
/// the employee identifier.
pub const ADMINISTRATIVE_COLUMNS: [&str; 4] =
    ["EmployeeCount", "EmployeeNumber", "Over18", "StandardHours"];

/// Name of the binary target column
pub const TARGET_COLUMN: &str = "Attrition";

/// Configuration for the raw-table cleaning stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Columns removed before anything else happens
    pub drop_columns: Vec<String>,

    /// Column holding the text target label
    pub target_column: String,

    /// Label mapped to 1
    pub positive_label: String,

    /// Label mapped to 0
    pub negative_label: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            drop_columns: ADMINISTRATIVE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            target_column: TARGET_COLUMN.to_string(),
            positive_label: "Yes".to_string(),
            negative_label: "No".to_string(),
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to replace the dropped column list
    pub fn with_drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the target column and its labels
    pub fn with_target(
        mut self,
        column: impl Into<String>,
        positive: impl Into<String>,
        negative: impl Into<String>,
    ) -> Self {
        self.target_column = column.into();
        self.positive_label = positive.into();
        self.negative_label = negative.into();
        self
    }
}

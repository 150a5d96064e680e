//! Categorical encoding: one-hot for the trainer, label codes for the
//! standalone feature encoder.

use crate::error::{AttritionError, Result};
use crate::utils;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn sorted_categories(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let unique: BTreeSet<String> = utils::column_str(df, column)?
        .into_iter()
        .flatten()
        .collect();
    Ok(unique.into_iter().collect())
}

/// One-hot encoder over the sorted categories seen at fit time.
///
/// Unknown or missing values encode as an all-zero block, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<(String, Vec<String>)>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the encoder to the listed columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.categories = columns
            .iter()
            .map(|col| Ok((col.to_string(), sorted_categories(df, col)?)))
            .collect::<Result<Vec<_>>>()?;
        self.is_fitted = true;
        Ok(self)
    }

    /// Total width of the encoded block
    pub fn n_outputs(&self) -> usize {
        self.categories.iter().map(|(_, cats)| cats.len()).sum()
    }

    /// Output names, `<column>_<category>`, in encoding order
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|(col, cats)| cats.iter().map(move |c| format!("{}_{}", col, c)))
            .collect()
    }

    /// Fitted categories per column
    pub fn categories(&self) -> &[(String, Vec<String>)] {
        &self.categories
    }

    /// Encode the fitted columns of `df` into one row per record.
    ///
    /// A column the encoder was fit on but `df` lacks is a schema error.
    pub fn transform(&self, df: &DataFrame) -> Result<Vec<Vec<f64>>> {
        if !self.is_fitted {
            return Err(AttritionError::ModelNotFitted);
        }

        let mut rows = vec![vec![0.0; self.n_outputs()]; df.height()];
        let mut offset = 0;

        for (col, cats) in &self.categories {
            if df.column(col).is_err() {
                return Err(AttritionError::SchemaMismatch(col.clone()));
            }
            for (row, value) in utils::column_str(df, col)?.iter().enumerate() {
                if let Some(idx) = value
                    .as_deref()
                    .and_then(|v| cats.binary_search_by(|c| c.as_str().cmp(v)).ok())
                {
                    rows[row][offset + idx] = 1.0;
                }
            }
            offset += cats.len();
        }

        Ok(rows)
    }
}

/// Maps each distinct value of one column to its index in sorted order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on one column of `df`
    pub fn fit(df: &DataFrame, column: &str) -> Result<Self> {
        Ok(Self {
            classes: sorted_categories(df, column)?,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Code for a value; values unseen at fit time are an error
    pub fn encode(&self, value: &str) -> Result<i64> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map(|idx| idx as i64)
            .map_err(|_| AttritionError::InvalidInput(format!("unseen label {:?}", value)))
    }

    /// Replace `column` in `df` with its integer codes
    pub fn transform(&self, df: &DataFrame, column: &str) -> Result<DataFrame> {
        let codes: Vec<Option<i64>> = utils::column_str(df, column)?
            .iter()
            .map(|v| v.as_deref().map(|s| self.encode(s)).transpose())
            .collect::<Result<_>>()?;

        let mut result = df.clone();
        result.with_column(Series::new(column.into(), codes))?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn departments() -> DataFrame {
        df!("Department" => &["Sales", "R&D", "Sales", "R&D"]).unwrap()
    }

    #[test]
    fn test_onehot_encoding() {
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&departments(), &["Department"]).unwrap();

        assert_eq!(
            encoder.feature_names(),
            vec!["Department_R&D".to_string(), "Department_Sales".to_string()]
        );

        let rows = encoder.transform(&departments()).unwrap();
        assert_eq!(rows[0], vec![0.0, 1.0]);
        assert_eq!(rows[1], vec![1.0, 0.0]);
    }

    #[test]
    fn test_onehot_unknown_category_is_all_zero() {
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&departments(), &["Department"]).unwrap();

        let unseen = df!("Department" => &["Marketing"]).unwrap();
        let rows = encoder.transform(&unseen).unwrap();
        assert_eq!(rows, vec![vec![0.0, 0.0]]);
    }

    #[test]
    fn test_onehot_missing_column() {
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&departments(), &["Department"]).unwrap();

        let other = df!("JobRole" => &["Manager"]).unwrap();
        assert!(matches!(
            encoder.transform(&other),
            Err(AttritionError::SchemaMismatch(col)) if col == "Department"
        ));
    }

    #[test]
    fn test_label_encoding_sorted() {
        let encoder = LabelEncoder::fit(&departments(), "Department").unwrap();
        assert_eq!(encoder.classes(), &["R&D".to_string(), "Sales".to_string()]);

        let result = encoder.transform(&departments(), "Department").unwrap();
        let col = result.column("Department").unwrap().i64().unwrap();
        assert_eq!(col.into_iter().collect::<Vec<_>>(), vec![Some(1), Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn test_label_unseen_value() {
        let encoder = LabelEncoder::fit(&departments(), "Department").unwrap();
        assert!(encoder.encode("Marketing").is_err());
    }
}

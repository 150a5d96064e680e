//! Missing value imputation

use super::ColumnType;
use crate::error::{AttritionError, Result};
use crate::utils::{self, is_integer_dtype};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy for imputing missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the median of the present values (numeric only)
    Median,
    /// Replace with the most frequent value, smallest value on ties
    MostFrequent,
}

impl ImputeStrategy {
    /// Strategy used for a column of the given type
    pub fn for_column(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Numeric => ImputeStrategy::Median,
            ColumnType::Categorical => ImputeStrategy::MostFrequent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeValue {
    Numeric(f64),
    Text(String),
}

/// Imputer holding one fill value per column, in column order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Imputer {
    fill_values: Vec<(String, ImputeValue)>,
    is_fitted: bool,
}

impl Imputer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit one fill value per listed column; the strategy follows the dtype
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.fill_values.clear();

        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| AttritionError::FeatureNotFound(col_name.to_string()))?;
            let column_type = ColumnType::of(column.dtype()).ok_or_else(|| {
                AttritionError::PreprocessingError(format!(
                    "cannot impute column {} of type {:?}",
                    col_name,
                    column.dtype()
                ))
            })?;

            let value = match ImputeStrategy::for_column(column_type) {
                ImputeStrategy::Median => {
                    let present: Vec<f64> = utils::column_f64(df, col_name)?
                        .into_iter()
                        .flatten()
                        .collect();
                    utils::median(&present).map(ImputeValue::Numeric)
                }
                ImputeStrategy::MostFrequent => {
                    Self::mode(&utils::column_str(df, col_name)?).map(ImputeValue::Text)
                }
            }
            .ok_or_else(|| {
                AttritionError::PreprocessingError(format!(
                    "column {} has no values to impute from",
                    col_name
                ))
            })?;

            self.fill_values.push((col_name.to_string(), value));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace nulls in every fitted column
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(AttritionError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (col_name, value) in &self.fill_values {
            let column = df
                .column(col_name)
                .map_err(|_| AttritionError::FeatureNotFound(col_name.clone()))?;
            let filled = Self::fill_series(column.as_materialized_series(), value)?;
            result.with_column(filled)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Fitted fill value for a column
    pub fn fill_value(&self, column: &str) -> Option<&ImputeValue> {
        self.fill_values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    fn mode(values: &[Option<String>]) -> Option<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in values.iter().flatten() {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }

        // BTreeMap iterates in sorted order; keep the first maximum
        let mut best: Option<(&str, usize)> = None;
        for (value, count) in counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value.to_string())
    }

    fn fill_series(series: &Series, value: &ImputeValue) -> Result<Series> {
        match value {
            ImputeValue::Numeric(fill) if is_integer_dtype(series.dtype()) && fill.fract() == 0.0 => {
                let ca = series
                    .cast(&DataType::Int64)
                    .map_err(|e| AttritionError::DataError(e.to_string()))?;
                let filled: Int64Chunked = ca
                    .i64()
                    .map_err(|e| AttritionError::DataError(e.to_string()))?
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(*fill as i64)))
                    .collect();
                Ok(filled.with_name(series.name().clone()).into_series())
            }
            ImputeValue::Numeric(fill) => {
                let ca = series
                    .cast(&DataType::Float64)
                    .map_err(|e| AttritionError::DataError(e.to_string()))?;
                let filled: Float64Chunked = ca
                    .f64()
                    .map_err(|e| AttritionError::DataError(e.to_string()))?
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(*fill)))
                    .collect();
                Ok(filled.with_name(series.name().clone()).into_series())
            }
            ImputeValue::Text(fill) => {
                let ca = series
                    .str()
                    .map_err(|e| AttritionError::DataError(e.to_string()))?;
                let filled: StringChunked = ca
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(fill.as_str()).to_string()))
                    .collect();
                Ok(filled.with_name(series.name().clone()).into_series())
            }
        }
    }
}

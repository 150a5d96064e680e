//! Standard (z-score) feature scaling

use crate::error::{AttritionError, Result};
use crate::utils;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Fitted parameters for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub column: String,
    /// Column mean
    pub mean: f64,
    /// Population standard deviation, 1.0 for constant columns
    pub scale: f64,
}

/// Scales each fitted column to zero mean and unit variance:
/// `(x - mean) / std`, using the population standard deviation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the scaler to the listed columns, ignoring nulls
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.params = columns
            .iter()
            .map(|col_name| {
                let values: Vec<f64> = utils::column_f64(df, col_name)?
                    .into_iter()
                    .flatten()
                    .collect();
                Ok(Self::compute_params(col_name, &values))
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace every fitted column with its scaled `Float64` version
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(AttritionError::ModelNotFitted);
        }

        let mut result = df.clone();
        for params in &self.params {
            let scaled: Float64Chunked = utils::column_f64(df, &params.column)?
                .into_iter()
                .map(|opt| opt.map(|v| (v - params.mean) / params.scale))
                .collect();
            result.with_column(scaled.with_name(params.column.as_str().into()).into_series())?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Scale a single value of the `idx`-th fitted column
    pub fn scale_value(&self, idx: usize, value: f64) -> f64 {
        let params = &self.params[idx];
        (value - params.mean) / params.scale
    }

    /// Fitted parameters, in column order
    pub fn params(&self) -> &[ScalerParams] {
        &self.params
    }

    /// Names of the fitted columns, in order
    pub fn columns(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.column.as_str()).collect()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn compute_params(column: &str, values: &[f64]) -> ScalerParams {
        if values.is_empty() {
            return ScalerParams {
                column: column.to_string(),
                mean: 0.0,
                scale: 1.0,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        ScalerParams {
            column: column.to_string(),
            mean,
            scale: if std == 0.0 { 1.0 } else { std },
        }
    }
}

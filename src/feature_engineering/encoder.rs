//! Label-encode + standardize the cleaned table

use crate::config::PipelinePaths;
use crate::error::{AttritionError, Result};
use crate::preprocessing::{LabelEncoder, StandardScaler, TARGET_COLUMN};
use crate::utils::{is_numeric_dtype, load_csv, save_artifact, write_csv};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Summary of one encoding run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingSummary {
    pub rows: usize,
    pub feature_names: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
}

/// Encodes every feature column of the cleaned table.
///
/// Column roles come from the runtime dtype: text columns are label
/// encoded, everything else is standardized with statistics of the
/// whole table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureEncoder {
    target_column: String,
    feature_names: Vec<String>,
    label_encoders: Vec<(String, LabelEncoder)>,
    scaler: StandardScaler,
}

impl FeatureEncoder {
    pub fn new() -> Self {
        Self::with_target(TARGET_COLUMN)
    }

    pub fn with_target(target_column: impl Into<String>) -> Self {
        Self {
            target_column: target_column.into(),
            ..Default::default()
        }
    }

    /// Fit the encoders and return the encoded table: features in their
    /// original order followed by the target.
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        let target = df
            .column(&self.target_column)
            .map_err(|_| AttritionError::FeatureNotFound(self.target_column.clone()))?
            .clone();

        let mut features = df.drop(&self.target_column)?;
        self.feature_names = features
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        let mut numeric = Vec::new();
        self.label_encoders.clear();
        for col in features.get_columns() {
            match col.dtype() {
                DataType::String => {
                    let name = col.name().to_string();
                    let encoder = LabelEncoder::fit(&features, &name)?;
                    self.label_encoders.push((name, encoder));
                }
                dt if *dt == DataType::Boolean || is_numeric_dtype(dt) => {
                    numeric.push(col.name().to_string())
                }
                dt => {
                    return Err(AttritionError::PreprocessingError(format!(
                        "column {} has unsupported type {:?}",
                        col.name(),
                        dt
                    )))
                }
            }
        }

        for (name, encoder) in &self.label_encoders {
            features = encoder.transform(&features, name)?;
        }

        let numeric_refs: Vec<&str> = numeric.iter().map(|s| s.as_str()).collect();
        let mut encoded = self.scaler.fit_transform(&features, &numeric_refs)?;
        encoded.with_column(target)?;
        Ok(encoded)
    }

    /// Ordered feature names of the encoded table, target excluded
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn label_encoders(&self) -> &[(String, LabelEncoder)] {
        &self.label_encoders
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Read the cleaned table, encode it and write the table plus the
    /// scaler, feature-name and label-map artifacts.
    pub fn run(&mut self, paths: &PipelinePaths) -> Result<EncodingSummary> {
        let start = Instant::now();
        let df = load_csv(&paths.cleaned_data)?;
        let mut encoded = self.fit_transform(&df)?;

        write_csv(&mut encoded, &paths.engineered_data)?;
        save_artifact(&self.scaler, &paths.scaler())?;
        save_artifact(&self.feature_names, &paths.feature_names())?;
        save_artifact(&self.label_encoders, &paths.label_encoders())?;

        let summary = EncodingSummary {
            rows: encoded.height(),
            feature_names: self.feature_names.clone(),
            categorical_columns: self.label_encoders.iter().map(|(n, _)| n.clone()).collect(),
            numeric_columns: self.scaler.columns().iter().map(|c| c.to_string()).collect(),
        };

        info!(
            output = %paths.engineered_data.display(),
            rows = summary.rows,
            categorical = summary.categorical_columns.len(),
            numeric = summary.numeric_columns.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Encoded features"
        );
        Ok(summary)
    }
}

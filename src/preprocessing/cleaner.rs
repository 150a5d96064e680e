//! Raw table cleaning: column removal, target mapping, imputation

use super::{CleaningConfig, Imputer};
use crate::error::{AttritionError, Result};
use crate::utils::{self, load_csv, write_csv};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// What a cleaning run did to the table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub dropped_columns: Vec<String>,
    /// Nulls filled per column, only columns that had any
    pub imputed: Vec<(String, usize)>,
    /// Rows whose target mapped to 1
    pub positive_count: usize,
}

/// Turns the raw HR export into the cleaned training table
#[derive(Debug, Clone, Default)]
pub struct DataCleaner {
    config: CleaningConfig,
}

impl DataCleaner {
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Clean a table in memory
    pub fn clean(&self, df: &DataFrame) -> Result<(DataFrame, CleaningReport)> {
        let mut report = CleaningReport {
            rows: df.height(),
            columns_before: df.width(),
            ..Default::default()
        };

        let mut result = df.clone();
        for col in &self.config.drop_columns {
            if result.column(col).is_err() {
                return Err(AttritionError::PreprocessingError(format!(
                    "column {} not found, cannot drop it",
                    col
                )));
            }
            result = result.drop(col)?;
            report.dropped_columns.push(col.clone());
        }

        let target = self.map_target(&result)?;
        report.positive_count = target.iter().filter(|v| **v == 1).count();
        result.with_column(Series::new(self.config.target_column.as_str().into(), target))?;

        let with_nulls: Vec<(String, usize)> = result
            .get_columns()
            .iter()
            .filter(|c| c.null_count() > 0)
            .map(|c| (c.name().to_string(), c.null_count()))
            .collect();

        if !with_nulls.is_empty() {
            let cols: Vec<&str> = with_nulls.iter().map(|(name, _)| name.as_str()).collect();
            result = Imputer::new().fit_transform(&result, &cols)?;
            for (name, count) in &with_nulls {
                debug!(column = %name, filled = count, "Imputed missing values");
            }
        }
        report.imputed = with_nulls;
        report.columns_after = result.width();

        Ok((result, report))
    }

    /// Load `input`, clean it and write the result to `output`.
    ///
    /// Nothing is written if any step fails.
    pub fn run(&self, input: &Path, output: &Path) -> Result<CleaningReport> {
        let start = Instant::now();
        let raw = load_csv(input)?;
        let (mut cleaned, report) = self.clean(&raw)?;
        write_csv(&mut cleaned, output)?;

        info!(
            input = %input.display(),
            output = %output.display(),
            rows = report.rows,
            columns = report.columns_after,
            imputed_columns = report.imputed.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Cleaned raw data"
        );
        Ok(report)
    }

    fn map_target(&self, df: &DataFrame) -> Result<Vec<i64>> {
        let column = &self.config.target_column;
        utils::column_str(df, column)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value.as_deref() {
                Some(v) if v == self.config.positive_label => Ok(1),
                Some(v) if v == self.config.negative_label => Ok(0),
                _ => Err(AttritionError::UnknownTargetLabel {
                    column: column.clone(),
                    row,
                    value,
                }),
            })
            .collect()
    }
}

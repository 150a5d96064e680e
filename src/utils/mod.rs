//! Utility functions shared by the pipeline stages

pub mod data_loader;

pub use data_loader::{load_artifact, load_csv, save_artifact, write_csv};

use crate::error::{AttritionError, Result};
use polars::prelude::*;

/// Check if a dtype holds numbers
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a dtype is an integer type
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    is_numeric_dtype(dtype) && !matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Read a column as `f64` values, keeping nulls
pub fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| AttritionError::FeatureNotFound(name.to_string()))?;
    let casted = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| AttritionError::DataError(format!("{}: {}", name, e)))?;
    let values = casted
        .f64()
        .map_err(|e| AttritionError::DataError(e.to_string()))?
        .into_iter()
        .collect();
    Ok(values)
}

/// Read a column as text values, keeping nulls; non-text columns are cast
pub fn column_str(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| AttritionError::FeatureNotFound(name.to_string()))?;
    let series = column.as_materialized_series();
    let casted = if series.dtype() == &DataType::String {
        series.clone()
    } else {
        series
            .cast(&DataType::String)
            .map_err(|e| AttritionError::DataError(format!("{}: {}", name, e)))?
    };
    let values = casted
        .str()
        .map_err(|e| AttritionError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

/// Median of a slice using the midpoint of the two central values
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Linear-interpolated quantile, `q` in `[0, 1]`
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&[10.0, 20.0, 40.0]), Some(20.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_quantile_linear() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&v, 0.25), Some(2.0));
        assert_eq!(quantile(&v, 1.0), Some(5.0));
    }

    #[test]
    fn test_column_helpers() {
        let df = df!(
            "n" => &[Some(1i64), None, Some(3)],
            "s" => &["a", "b", "c"],
        )
        .unwrap();
        assert_eq!(column_f64(&df, "n").unwrap(), vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(column_str(&df, "n").unwrap()[0].as_deref(), Some("1"));
        assert_eq!(column_str(&df, "s").unwrap()[2].as_deref(), Some("c"));
        assert!(matches!(
            column_f64(&df, "missing"),
            Err(AttritionError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn test_dtype_predicates() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_integer_dtype(&DataType::Int32));
        assert!(!is_integer_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
    }
}

//! Data preprocessing module
//!
//! Provides the building blocks of the cleaning stage and the encoders:
//! - Administrative column removal and target label mapping
//! - Missing value imputation (median / most frequent)
//! - Standard scaling with population statistics
//! - One-hot and label encoding

mod cleaner;
mod config;
mod encoder;
mod imputer;
mod scaler;

pub use cleaner::{CleaningReport, DataCleaner};
pub use config::{CleaningConfig, ADMINISTRATIVE_COLUMNS, TARGET_COLUMN};
pub use encoder::{LabelEncoder, OneHotEncoder};
pub use imputer::{ImputeStrategy, ImputeValue, Imputer};
pub use scaler::{ScalerParams, StandardScaler};

use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column data type for preprocessing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
}

impl ColumnType {
    /// Role of a column with the given dtype; `None` for types neither
    /// stage can handle (dates, lists, ...)
    pub fn of(dtype: &DataType) -> Option<Self> {
        match dtype {
            DataType::String | DataType::Boolean => Some(ColumnType::Categorical),
            dt if is_numeric_dtype(dt) => Some(ColumnType::Numeric),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_of() {
        assert_eq!(ColumnType::of(&DataType::Int64), Some(ColumnType::Numeric));
        assert_eq!(ColumnType::of(&DataType::Float32), Some(ColumnType::Numeric));
        assert_eq!(ColumnType::of(&DataType::String), Some(ColumnType::Categorical));
        assert_eq!(ColumnType::of(&DataType::Date), None);
    }
}

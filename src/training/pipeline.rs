//! The persisted composite artifact: column transformer + classifier

use super::config::ModelType;
use super::decision_tree::argmax;
use super::linear_models::LogisticRegression;
use super::random_forest::RandomForest;
use crate::error::{AttritionError, Result};
use crate::preprocessing::{OneHotEncoder, StandardScaler};
use crate::utils::{self, load_artifact, save_artifact};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Standardizes the numeric columns and one-hot encodes the categorical
/// ones. Output order: numeric block, then one block per categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformer {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    scaler: StandardScaler,
    encoder: OneHotEncoder,
}

impl ColumnTransformer {
    pub fn new(numeric_columns: Vec<String>, categorical_columns: Vec<String>) -> Self {
        Self {
            numeric_columns,
            categorical_columns,
            scaler: StandardScaler::new(),
            encoder: OneHotEncoder::new(),
        }
    }

    fn check_schema(&self, df: &DataFrame) -> Result<()> {
        let missing = self
            .numeric_columns
            .iter()
            .chain(&self.categorical_columns)
            .find(|col| df.column(col.as_str()).is_err());
        match missing {
            Some(col) => Err(AttritionError::SchemaMismatch(col.clone())),
            None => Ok(()),
        }
    }

    /// Fit the scaler and encoder; other columns of `df` are ignored
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.check_schema(df)?;
        let numeric: Vec<&str> = self.numeric_columns.iter().map(|s| s.as_str()).collect();
        let categorical: Vec<&str> = self.categorical_columns.iter().map(|s| s.as_str()).collect();
        self.scaler.fit(df, &numeric)?;
        self.encoder.fit(df, &categorical)?;
        Ok(self)
    }

    /// Encode `df` into the model's feature matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.scaler.is_fitted() {
            return Err(AttritionError::ModelNotFitted);
        }
        self.check_schema(df)?;

        let n_numeric = self.numeric_columns.len();
        let mut x = Array2::zeros((df.height(), self.n_features()));

        for (j, col) in self.numeric_columns.iter().enumerate() {
            for (i, value) in utils::column_f64(df, col)?.into_iter().enumerate() {
                let value = value.ok_or_else(|| {
                    AttritionError::InvalidInput(format!(
                        "missing or non-numeric {} at row {}",
                        col, i
                    ))
                })?;
                x[[i, j]] = self.scaler.scale_value(j, value);
            }
        }

        for (i, row) in self.encoder.transform(df)?.into_iter().enumerate() {
            for (k, v) in row.into_iter().enumerate() {
                x[[i, n_numeric + k]] = v;
            }
        }

        Ok(x)
    }

    pub fn n_features(&self) -> usize {
        self.numeric_columns.len() + self.encoder.n_outputs()
    }

    /// Encoded feature names in matrix column order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric_columns.clone();
        names.extend(self.encoder.feature_names());
        names
    }

    /// Columns a record must carry
    pub fn input_columns(&self) -> impl Iterator<Item = &str> {
        self.numeric_columns
            .iter()
            .chain(&self.categorical_columns)
            .map(|s| s.as_str())
    }

    /// Categories learned for each categorical column
    pub fn categories(&self) -> &[(String, Vec<String>)] {
        self.encoder.categories()
    }
}

/// Enum to hold the fitted classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl TrainedModel {
    pub fn model_type(&self) -> ModelType {
        match self {
            TrainedModel::LogisticRegression(_) => ModelType::LogisticRegression,
            TrainedModel::RandomForest(_) => ModelType::RandomForest,
        }
    }

    /// `[p0, p1]` per row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            TrainedModel::LogisticRegression(m) => m.predict_proba(x),
            TrainedModel::RandomForest(m) => m.predict_proba(x),
        }
    }
}

/// Fitted transformer + classifier, callable on raw employee records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttritionPipeline {
    transformer: ColumnTransformer,
    model: TrainedModel,
}

impl AttritionPipeline {
    pub fn new(transformer: ColumnTransformer, model: TrainedModel) -> Self {
        Self { transformer, model }
    }

    /// Class probabilities `[p0, p1]` per record; each row sums to 1
    pub fn predict_proba(&self, records: &DataFrame) -> Result<Array2<f64>> {
        let x = self.transformer.transform(records)?;
        self.model.predict_proba(&x)
    }

    /// Predicted label per record, 0 or 1
    pub fn predict(&self, records: &DataFrame) -> Result<Vec<usize>> {
        let proba = self.predict_proba(records)?;
        Ok(proba.rows().into_iter().map(argmax).collect())
    }

    /// Probability of attrition per record
    pub fn attrition_probability(&self, records: &DataFrame) -> Result<Vec<f64>> {
        let proba = self.predict_proba(records)?;
        Ok(proba.column(1).to_vec())
    }

    pub fn model_type(&self) -> ModelType {
        self.model.model_type()
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn transformer(&self) -> &ColumnTransformer {
        &self.transformer
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.transformer.feature_names()
    }

    /// Save the artifact; the extension picks JSON or bincode
    pub fn save(&self, path: &Path) -> Result<()> {
        save_artifact(self, path)?;
        info!(path = %path.display(), model = %self.model_type(), "Saved pipeline");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let pipeline: Self = load_artifact(path)?;
        info!(path = %path.display(), model = %pipeline.model_type(), "Loaded pipeline");
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "Age" => &[20i64, 30, 40, 50],
            "Department" => &["Sales", "R&D", "Sales", "R&D"],
            "Ignored" => &[1, 2, 3, 4],
        )
        .unwrap()
    }

    fn fitted() -> ColumnTransformer {
        let mut transformer =
            ColumnTransformer::new(vec!["Age".to_string()], vec!["Department".to_string()]);
        transformer.fit(&frame()).unwrap();
        transformer
    }

    #[test]
    fn test_transformer_layout() {
        let transformer = fitted();
        assert_eq!(
            transformer.feature_names(),
            vec!["Age", "Department_R&D", "Department_Sales"]
        );

        let x = transformer.transform(&frame()).unwrap();
        assert_eq!(x.dim(), (4, 3));
        assert_eq!(x.row(0).to_vec()[1..], [0.0, 1.0]);
        let age_mean: f64 = x.column(0).sum() / 4.0;
        assert!(age_mean.abs() < 1e-12);
    }

    #[test]
    fn test_transformer_missing_column() {
        let transformer = fitted();
        let df = frame().drop("Department").unwrap();
        assert!(matches!(
            transformer.transform(&df),
            Err(AttritionError::SchemaMismatch(col)) if col == "Department"
        ));
    }

    #[test]
    fn test_transformer_unseen_category() {
        let transformer = fitted();
        let df = df!("Age" => &[35i64], "Department" => &["Marketing"]).unwrap();
        let x = transformer.transform(&df).unwrap();
        assert_eq!(x.row(0).to_vec()[1..], [0.0, 0.0]);
    }

    #[test]
    fn test_pipeline_predict() {
        let transformer = fitted();
        let x = transformer.transform(&frame()).unwrap();
        let mut model = LogisticRegression::new();
        model.fit(&x, &[0, 1, 0, 1]).unwrap();

        let pipeline = AttritionPipeline::new(transformer, TrainedModel::LogisticRegression(model));
        let labels = pipeline.predict(&frame()).unwrap();
        assert_eq!(labels.len(), 4);
        assert_eq!(pipeline.model_type(), ModelType::LogisticRegression);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.bin");
        pipeline.save(&path).unwrap();
        let loaded = AttritionPipeline::load(&path).unwrap();
        assert_eq!(
            loaded.predict_proba(&frame()).unwrap(),
            pipeline.predict_proba(&frame()).unwrap()
        );
    }
}

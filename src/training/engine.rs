//! Training engine: fit both candidates, score them, keep the better one

use super::config::{ModelType, TrainerConfig};
use super::linear_models::LogisticRegression;
use super::metrics::{self, ClassificationReport, ConfusionMatrix};
use super::pipeline::{AttritionPipeline, ColumnTransformer, TrainedModel};
use super::random_forest::RandomForest;
use super::split::stratified_split;
use crate::config::PipelinePaths;
use crate::error::{AttritionError, Result};
use crate::utils::{self, load_csv, save_artifact};
use chrono::{DateTime, Utc};
use ndarray::Axis;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Held-out scores of one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateReport {
    pub model: ModelType,
    pub accuracy: f64,
    pub recall: f64,
    pub roc_auc: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub classification_report: ClassificationReport,
    pub training_time_secs: f64,
}

/// Outcome of a training run, persisted next to the artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub selected: ModelType,
    pub candidates: Vec<CandidateReport>,
    pub random_state: u64,
    pub n_train: usize,
    pub n_test: usize,
    pub feature_names: Vec<String>,
    /// Forest impurity importances, highest first
    pub top_features: Vec<(String, f64)>,
    pub trained_at: DateTime<Utc>,
}

impl TrainingReport {
    pub fn candidate(&self, model: ModelType) -> Option<&CandidateReport> {
        self.candidates.iter().find(|c| c.model == model)
    }

    pub fn selected_candidate(&self) -> Option<&CandidateReport> {
        self.candidate(self.selected)
    }
}

/// Main training engine
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Split, fit both candidates on the training rows, score them on the
    /// held-out rows and return the winning pipeline.
    ///
    /// The forest wins only with a strictly higher ROC-AUC.
    pub fn fit(&self, df: &DataFrame) -> Result<(AttritionPipeline, TrainingReport)> {
        let y = self.extract_target(df)?;
        let split = stratified_split(&y, self.config.test_size, self.config.random_state)?;

        let train_df = take_rows(df, &split.train)?;
        let test_df = take_rows(df, &split.test)?;
        let y_train: Vec<usize> = split.train.iter().map(|&i| y[i]).collect();
        let y_test: Vec<usize> = split.test.iter().map(|&i| y[i]).collect();

        let mut transformer = ColumnTransformer::new(
            self.config.numeric_columns.clone(),
            self.config.categorical_columns.clone(),
        );
        transformer.fit(&train_df)?;
        let x_train = transformer.transform(&train_df)?;
        let x_test = transformer.transform(&test_df)?;

        info!(
            train = x_train.nrows(),
            test = x_test.nrows(),
            features = x_train.ncols(),
            "Prepared training data"
        );

        let start = Instant::now();
        let mut logistic = LogisticRegression::from_config(&self.config.logistic);
        logistic.fit(&x_train, &y_train)?;
        let logistic = TrainedModel::LogisticRegression(logistic);
        let logistic_report = evaluate(&logistic, &x_test, &y_test, start)?;

        let start = Instant::now();
        let mut forest = RandomForest::from_config(&self.config.forest, self.config.random_state);
        forest.fit(&x_train, &y_train)?;
        let feature_names = transformer.feature_names();
        let top_features = ranked_importances(&forest, &feature_names);
        let forest = TrainedModel::RandomForest(forest);
        let forest_report = evaluate(&forest, &x_test, &y_test, start)?;

        let selected = select_model(logistic_report.roc_auc, forest_report.roc_auc);
        let model = match selected {
            ModelType::RandomForest => forest,
            ModelType::LogisticRegression => logistic,
        };

        info!(
            model = %selected,
            logistic_auc = logistic_report.roc_auc,
            forest_auc = forest_report.roc_auc,
            "Selected model"
        );

        let report = TrainingReport {
            selected,
            candidates: vec![logistic_report, forest_report],
            random_state: self.config.random_state,
            n_train: y_train.len(),
            n_test: y_test.len(),
            feature_names,
            top_features,
            trained_at: Utc::now(),
        };

        Ok((AttritionPipeline::new(transformer, model), report))
    }

    /// Train on the cleaned table and persist the artifact and its report
    pub fn run(&self, paths: &PipelinePaths) -> Result<TrainingReport> {
        let df = load_csv(&paths.cleaned_data)?;
        let (pipeline, report) = self.fit(&df)?;

        pipeline.save(&paths.pipeline)?;
        save_artifact(&report, &paths.training_report())?;
        Ok(report)
    }

    fn extract_target(&self, df: &DataFrame) -> Result<Vec<usize>> {
        let column = &self.config.target_column;
        utils::column_f64(df, column)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(v) if v == 0.0 => Ok(0),
                Some(v) if v == 1.0 => Ok(1),
                other => Err(AttritionError::UnknownTargetLabel {
                    column: column.clone(),
                    row,
                    value: other.map(|v| v.to_string()),
                }),
            })
            .collect()
    }
}

/// Candidate kept for a pair of held-out ROC-AUC scores; the forest needs a
/// strictly higher score
pub fn select_model(logistic_auc: f64, forest_auc: f64) -> ModelType {
    if forest_auc > logistic_auc {
        ModelType::RandomForest
    } else {
        ModelType::LogisticRegression
    }
}

fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec("idx".into(), rows.iter().map(|&i| i as IdxSize).collect());
    Ok(df.take(&idx)?)
}

fn evaluate(
    model: &TrainedModel,
    x_test: &ndarray::Array2<f64>,
    y_test: &[usize],
    started: Instant,
) -> Result<CandidateReport> {
    let training_time_secs = started.elapsed().as_secs_f64();
    let proba = model.predict_proba(x_test)?;
    let scores: Vec<f64> = proba.column(1).to_vec();
    let y_pred: Vec<usize> = proba
        .axis_iter(Axis(0))
        .map(super::decision_tree::argmax)
        .collect();

    let confusion_matrix = ConfusionMatrix::compute(y_test, &y_pred, 2)?;
    let classification_report = ClassificationReport::from_confusion(&confusion_matrix);
    let report = CandidateReport {
        model: model.model_type(),
        accuracy: metrics::accuracy(y_test, &y_pred)?,
        recall: metrics::recall(y_test, &y_pred)?,
        roc_auc: metrics::roc_auc(y_test, &scores)?,
        confusion_matrix,
        classification_report,
        training_time_secs,
    };

    info!(
        model = %report.model,
        accuracy = report.accuracy,
        recall = report.recall,
        roc_auc = report.roc_auc,
        secs = report.training_time_secs,
        "Evaluated candidate"
    );
    debug!(
        model = %report.model,
        confusion = ?report.confusion_matrix.counts,
        "\n{}",
        report.classification_report
    );
    Ok(report)
}

fn ranked_importances(forest: &RandomForest, names: &[String]) -> Vec<(String, f64)> {
    let Some(importances) = forest.feature_importances() else {
        return Vec::new();
    };
    let mut ranked: Vec<(String, f64)> = names.iter().cloned().zip(importances.iter().copied()).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(10);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic(n: usize) -> DataFrame {
        let age: Vec<i64> = (0..n).map(|i| 20 + (i * 7 % 40) as i64).collect();
        let overtime: Vec<&str> = (0..n).map(|i| if i % 3 == 0 { "Yes" } else { "No" }).collect();
        let attrition: Vec<i64> = (0..n)
            .map(|i| i64::from(i % 3 == 0 && (i * 7 % 40) < 20))
            .collect();
        df!(
            "Age" => age,
            "OverTime" => overtime,
            "Attrition" => attrition,
        )
        .unwrap()
    }

    fn config() -> TrainerConfig {
        TrainerConfig::new()
            .with_n_estimators(15)
            .with_columns(["Age"], ["OverTime"])
    }

    #[test]
    fn test_fit_reports_both_candidates() {
        let df = synthetic(120);
        let (pipeline, report) = Trainer::new(config()).fit(&df).unwrap();

        assert_eq!(report.candidates.len(), 2);
        assert_eq!(report.n_train + report.n_test, 120);
        assert_eq!(pipeline.model_type(), report.selected);
        assert_eq!(report.feature_names, vec!["Age", "OverTime_No", "OverTime_Yes"]);

        let logistic = report.candidate(ModelType::LogisticRegression).unwrap();
        let forest = report.candidate(ModelType::RandomForest).unwrap();
        let expected = if forest.roc_auc > logistic.roc_auc {
            ModelType::RandomForest
        } else {
            ModelType::LogisticRegression
        };
        assert_eq!(report.selected, expected);
    }

    #[test]
    fn test_select_model() {
        assert_eq!(select_model(0.81, 0.81), ModelType::LogisticRegression);
        assert_eq!(select_model(0.78, 0.83), ModelType::RandomForest);
        assert_eq!(select_model(0.83, 0.78), ModelType::LogisticRegression);
        assert_eq!(select_model(1.0, 1.0), ModelType::LogisticRegression);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let df = synthetic(90);
        let (_, a) = Trainer::new(config()).fit(&df).unwrap();
        let (_, b) = Trainer::new(config()).fit(&df).unwrap();
        for (ca, cb) in a.candidates.iter().zip(&b.candidates) {
            assert_eq!(ca.roc_auc, cb.roc_auc);
        }
    }

    #[test]
    fn test_non_binary_target() {
        let mut df = synthetic(30);
        df.with_column(Series::new("Attrition".into(), vec![2i64; 30]))
            .unwrap();
        assert!(matches!(
            Trainer::new(config()).fit(&df),
            Err(AttritionError::UnknownTargetLabel { .. })
        ));
    }
}

//! Model training module
//!
//! Provides the attrition classifiers and the machinery around them:
//! - Logistic regression (L2, gradient descent)
//! - Decision trees and class-balanced Random Forests
//! - Stratified train/test split
//! - Accuracy, recall, ROC-AUC and classification reports
//! - The persisted transformer + classifier pipeline

mod config;
mod engine;
pub mod decision_tree;
pub mod linear_models;
pub mod metrics;
pub mod pipeline;
pub mod random_forest;
pub mod split;

pub use config::{
    ClassWeight, ForestConfig, LogisticConfig, ModelType, TrainerConfig, CATEGORICAL_COLUMNS,
    NUMERIC_COLUMNS,
};
pub use decision_tree::{DecisionTree, TreeNode};
pub use engine::{select_model, CandidateReport, Trainer, TrainingReport};
pub use linear_models::LogisticRegression;
pub use metrics::{ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use pipeline::{AttritionPipeline, ColumnTransformer, TrainedModel};
pub use random_forest::{MaxFeatures, RandomForest};
pub use split::{stratified_split, SplitIndices};

//! Employee attrition pipeline
//!
//! A batch pipeline over an HR CSV followed by a small dashboard:
//!
//! - [`preprocessing`] - drop administrative columns, encode the target, impute
//! - [`feature_engineering`] - label-encode categoricals and scale numerics
//! - [`training`] - logistic regression vs. random forest, selected by ROC-AUC
//! - [`dashboard`] - KPIs, form options, risk-banded predictions and charts
//! - [`server`] - HTTP API and embedded UI over the dashboard
//! - [`cli`] - command-line entry points for every stage

pub mod error;
pub mod config;

pub mod preprocessing;
pub mod feature_engineering;
pub mod training;
pub mod dashboard;

pub mod utils;

pub mod server;
pub mod cli;

pub use error::{AttritionError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{AttritionError, Result};
    pub use crate::config::PipelinePaths;

    pub use crate::preprocessing::{CleaningConfig, CleaningReport, DataCleaner};
    pub use crate::feature_engineering::{EncodingSummary, FeatureEncoder};
    pub use crate::training::{
        AttritionPipeline, ModelType, Trainer, TrainerConfig, TrainingReport,
    };
    pub use crate::dashboard::{DashboardContext, EmployeeProfile, Prediction, RiskBand};
}

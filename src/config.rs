//! File layout shared by the pipeline stages and the dashboard

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Locations of every input and artifact the pipeline reads or writes.
///
/// Defaults follow the `data/` + `models/` layout and can be overridden with
/// environment variables, then with CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelinePaths {
    pub raw_data: PathBuf,
    pub cleaned_data: PathBuf,
    pub engineered_data: PathBuf,
    pub models_dir: PathBuf,
    pub pipeline: PathBuf,
}

impl Default for PipelinePaths {
    fn default() -> Self {
        let models_dir = PathBuf::from(
            std::env::var("MODELS_DIR").unwrap_or_else(|_| "models".to_string()),
        );
        let pipeline = std::env::var("PIPELINE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| models_dir.join("attrition_pipeline.bin"));

        Self {
            raw_data: env_path("RAW_DATA_PATH", "data/raw/hr_attrition.csv"),
            cleaned_data: env_path("PROCESSED_DATA_PATH", "data/processed/cleaned_hr_data.csv"),
            engineered_data: env_path(
                "ENGINEERED_DATA_PATH",
                "data/processed/engineered_hr_data.csv",
            ),
            models_dir,
            pipeline,
        }
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    PathBuf::from(std::env::var(var).unwrap_or_else(|_| default.to_string()))
}

impl PipelinePaths {
    /// Layout rooted at `base` (used by tests and the `--root` flag)
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let models_dir = base.join("models");
        Self {
            raw_data: base.join("data/raw/hr_attrition.csv"),
            cleaned_data: base.join("data/processed/cleaned_hr_data.csv"),
            engineered_data: base.join("data/processed/engineered_hr_data.csv"),
            pipeline: models_dir.join("attrition_pipeline.bin"),
            models_dir,
        }
    }

    pub fn with_raw_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.raw_data = path.into();
        self
    }

    pub fn with_cleaned_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.cleaned_data = path.into();
        self
    }

    pub fn with_pipeline(mut self, path: impl Into<PathBuf>) -> Self {
        self.pipeline = path.into();
        self
    }

    pub fn scaler(&self) -> PathBuf {
        self.models_dir.join("scaler.json")
    }

    pub fn feature_names(&self) -> PathBuf {
        self.models_dir.join("feature_names.json")
    }

    pub fn label_encoders(&self) -> PathBuf {
        self.models_dir.join("label_encoders.json")
    }

    /// The training report lives next to the pipeline artifact
    pub fn training_report(&self) -> PathBuf {
        self.pipeline
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("training_report.json")
    }
}

//! HR dashboard domain layer
//!
//! [`DashboardContext`] is built once from the persisted pipeline and the
//! cleaned table, then shared read-only by every request handler.

pub mod analytics;
pub mod profile;

pub use analytics::{
    BoxStats, CategoryCount, ChartData, ChartKind, ClassDistribution, DatasetInfo, EdaReport, Kpis,
};
pub use profile::{EmployeeProfile, FormOptions, NumericRange};

use crate::config::PipelinePaths;
use crate::error::Result;
use crate::training::{AttritionPipeline, TrainingReport};
use crate::utils::{load_artifact, load_csv};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Attrition risk category of a probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// `< 0.4` Low, `< 0.7` Medium, otherwise High
    pub fn from_probability(p: f64) -> Self {
        if p < 0.4 {
            RiskBand::Low
        } else if p < 0.7 {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "Low Attrition Risk",
            RiskBand::Medium => "Medium Attrition Risk",
            RiskBand::High => "High Attrition Risk",
        }
    }
}

/// Model output for one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: usize,
    pub probability: f64,
    pub risk: RiskBand,
}

impl Prediction {
    pub fn new(label: usize, probability: f64) -> Self {
        Self {
            label,
            probability,
            risk: RiskBand::from_probability(probability),
        }
    }
}

/// Everything the dashboard serves, loaded once per process
pub struct DashboardContext {
    pipeline: AttritionPipeline,
    data: DataFrame,
    kpis: Kpis,
    options: FormOptions,
    report: Option<TrainingReport>,
}

impl DashboardContext {
    /// Build a context from already-loaded parts
    pub fn new(
        pipeline: AttritionPipeline,
        data: DataFrame,
        report: Option<TrainingReport>,
    ) -> Result<Self> {
        let kpis = Kpis::compute(&data)?;
        let options = FormOptions::from_frame(&data)?;
        Ok(Self {
            pipeline,
            data,
            kpis,
            options,
            report,
        })
    }

    /// Load the pipeline, the cleaned table and, if present, the training
    /// report
    pub fn load(paths: &PipelinePaths) -> Result<Self> {
        let pipeline = AttritionPipeline::load(&paths.pipeline)?;
        let data = load_csv(&paths.cleaned_data)?;

        let report_path = paths.training_report();
        let report = match load_artifact::<TrainingReport>(&report_path) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(path = %report_path.display(), error = %e, "Training report unavailable");
                None
            }
        };

        let context = Self::new(pipeline, data, report)?;
        info!(
            employees = context.kpis.total_employees,
            model = %context.pipeline.model_type(),
            "Dashboard context ready"
        );
        Ok(context)
    }

    pub fn kpis(&self) -> &Kpis {
        &self.kpis
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn training_report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }

    pub fn pipeline(&self) -> &AttritionPipeline {
        &self.pipeline
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Validate and score one profile
    pub fn predict(&self, profile: &EmployeeProfile) -> Result<Prediction> {
        profile.validate()?;
        let records = profile.to_frame()?;
        let proba = self.pipeline.predict_proba(&records)?;
        let (p0, p1) = (proba[[0, 0]], proba[[0, 1]]);
        Ok(Prediction::new(usize::from(p1 > p0), p1))
    }

    /// Chart data from the full cleaned table
    pub fn chart(&self, kind: ChartKind) -> Result<ChartData> {
        ChartData::compute(&self.data, kind)
    }
}

//! Command-line interface for the attrition pipeline
//!
//! Each pipeline stage is its own subcommand; `run` chains the three batch
//! stages and `serve` starts the dashboard.

use clap::{Args, Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelinePaths;
use crate::dashboard::{DatasetInfo, EdaReport, RiskBand};
use crate::feature_engineering::FeatureEncoder;
use crate::preprocessing::{CleaningConfig, DataCleaner};
use crate::training::{AttritionPipeline, Trainer, TrainerConfig, TrainingReport};
use crate::utils::{load_csv, write_csv};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58;

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "hr-attrition")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Employee attrition pipeline and HR dashboard")]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub paths: PathArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Path overrides shared by every subcommand
#[derive(Args, Debug, Default)]
pub struct PathArgs {
    /// Root directory holding `data/` and `models/`
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Raw HR CSV
    #[arg(long, global = true)]
    pub raw_data: Option<PathBuf>,

    /// Cleaned CSV written by `preprocess`
    #[arg(long, global = true)]
    pub cleaned_data: Option<PathBuf>,

    /// Trained pipeline artifact
    #[arg(long, global = true)]
    pub pipeline: Option<PathBuf>,
}

impl PathArgs {
    /// Environment defaults, then `--root`, then per-file flags
    pub fn resolve(&self) -> PipelinePaths {
        let mut paths = match &self.root {
            Some(root) => PipelinePaths::rooted_at(root),
            None => PipelinePaths::default(),
        };
        if let Some(p) = &self.raw_data {
            paths = paths.with_raw_data(p);
        }
        if let Some(p) = &self.cleaned_data {
            paths = paths.with_cleaned_data(p);
        }
        if let Some(p) = &self.pipeline {
            paths = paths.with_pipeline(p);
        }
        paths
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean the raw CSV: drop administrative columns, encode the target, impute
    Preprocess,

    /// Label-encode and scale the cleaned table for analysis
    Engineer,

    /// Train both candidates and persist the better one
    Train {
        /// Random seed for the split and the forest
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of trees in the random forest
        #[arg(long, default_value = "200")]
        n_estimators: usize,
    },

    /// Score every row of a CSV with the trained pipeline
    Predict {
        /// Input CSV with the twelve feature columns
        #[arg(short, long)]
        data: PathBuf,

        /// Output CSV (defaults to `<input>_predictions.csv`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print KPIs and chart summaries of the cleaned table
    Eda,

    /// Show dataset information
    Info {
        /// Data file (defaults to the raw CSV)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Start the HR dashboard
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "API_PORT", default_value = "8080")]
        port: u16,

        /// Host to bind to
        #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
        host: String,
    },

    /// Run preprocess, engineer and train in sequence
    Run {
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

// ─── Stages ────────────────────────────────────────────────────────────────────

pub fn cmd_preprocess(paths: &PipelinePaths) -> anyhow::Result<()> {
    section("Preprocess");

    step_run(&format!("Cleaning {}", paths.raw_data.display()));
    let start = Instant::now();
    let report = DataCleaner::new(CleaningConfig::default()).run(&paths.raw_data, &paths.cleaned_data)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!("  {:<14} {}", muted("Rows"), report.rows);
    println!("  {:<14} {} → {}", muted("Columns"), report.columns_before, report.columns_after);
    println!("  {:<14} {}", muted("Dropped"), report.dropped_columns.join(", "));
    for (column, count) in &report.imputed {
        println!("  {:<14} {} ({} values)", muted("Imputed"), column, count);
    }
    println!("  {:<14} {}", muted("Attrition"), report.positive_count);
    println!("  {:<14} {}", muted("Output"), paths.cleaned_data.display());
    println!();
    Ok(())
}

pub fn cmd_engineer(paths: &PipelinePaths) -> anyhow::Result<()> {
    section("Feature Engineering");

    step_run("Encoding and scaling");
    let start = Instant::now();
    let summary = FeatureEncoder::new().run(paths)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!("  {:<14} {}", muted("Rows"), summary.rows);
    println!("  {:<14} {}", muted("Features"), summary.feature_names.len());
    println!("  {:<14} {}", muted("Categorical"), summary.categorical_columns.join(", "));
    println!("  {:<14} {}", muted("Output"), paths.engineered_data.display());
    println!("  {:<14} {}", muted("Artifacts"), paths.models_dir.display());
    println!();
    Ok(())
}

pub fn cmd_train(paths: &PipelinePaths, seed: u64, n_estimators: usize) -> anyhow::Result<()> {
    section("Train");

    let config = TrainerConfig::default()
        .with_random_state(seed)
        .with_n_estimators(n_estimators);

    step_run("Fitting logistic regression and random forest");
    let start = Instant::now();
    let report = Trainer::new(config).run(paths)?;
    step_done(&format!("{:.2}s", start.elapsed().as_secs_f64()));

    print_training_report(&report);
    println!("  {:<14} {}", muted("Pipeline"), paths.pipeline.display());
    println!();
    Ok(())
}

fn print_training_report(report: &TrainingReport) {
    println!();
    println!(
        "  {:<22} {:>9} {:>9} {:>9} {:>8}",
        muted("Model"),
        muted("Accuracy"),
        muted("Recall"),
        muted("ROC-AUC"),
        muted("Time")
    );
    println!("  {}", dim(&"─".repeat(62)));
    for candidate in &report.candidates {
        let name = candidate.model.to_string();
        let name = if candidate.model == report.selected {
            format!("{} {}", name, ok("*"))
        } else {
            name
        };
        let pad = 22usize.saturating_sub(strip_ansi(&name).chars().count());
        println!(
            "  {}{} {:>9.4} {:>9.4} {:>9.4} {:>7.2}s",
            name,
            " ".repeat(pad),
            candidate.accuracy,
            candidate.recall,
            candidate.roc_auc,
            candidate.training_time_secs
        );
    }

    if let Some(selected) = report.selected_candidate() {
        section(&format!("Classification Report ({})", report.selected));
        for line in selected.classification_report.to_string().lines() {
            println!("  {}", line);
        }
    }

    if !report.top_features.is_empty() {
        section("Top Features");
        for (name, importance) in &report.top_features {
            println!("  {:<36} {:.4}", name, importance);
        }
    }
}

pub fn cmd_predict(paths: &PipelinePaths, data_path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading pipeline");
    let pipeline = AttritionPipeline::load(&paths.pipeline)?;
    step_done(&pipeline.model_type().to_string());

    step_run("Loading data");
    let df = load_csv(data_path)?;
    step_done(&format!("{} rows", df.height()));

    step_run("Scoring");
    let mut scored = score_frame(&pipeline, &df)?;
    step_done("");

    let output = match output {
        Some(p) => p.to_path_buf(),
        None => default_output_path(data_path),
    };
    write_csv(&mut scored, &output)?;

    let high = scored
        .column("RiskBand")?
        .as_materialized_series()
        .str()?
        .into_iter()
        .filter(|v| *v == Some("High"))
        .count();
    println!("  {:<14} {}", muted("High risk"), high);
    println!("  {:<14} {}", muted("Output"), output.display());
    println!();
    Ok(())
}

/// Append `Prediction`, `AttritionProbability` and `RiskBand` columns
pub fn score_frame(pipeline: &AttritionPipeline, df: &DataFrame) -> anyhow::Result<DataFrame> {
    let proba = pipeline.predict_proba(df)?;
    let labels: Vec<i64> = proba
        .rows()
        .into_iter()
        .map(|row| i64::from(row[1] > row[0]))
        .collect();
    let probability: Vec<f64> = proba.column(1).to_vec();
    let risk: Vec<&str> = probability
        .iter()
        .map(|&p| match RiskBand::from_probability(p) {
            RiskBand::Low => "Low",
            RiskBand::Medium => "Medium",
            RiskBand::High => "High",
        })
        .collect();

    let mut scored = df.clone();
    scored.with_column(Series::new("Prediction".into(), labels))?;
    scored.with_column(Series::new("AttritionProbability".into(), probability))?;
    scored.with_column(Series::new("RiskBand".into(), risk))?;
    Ok(scored)
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    input.with_file_name(format!("{}_predictions.csv", stem))
}

pub fn cmd_eda(paths: &PipelinePaths) -> anyhow::Result<()> {
    section("Exploratory Analysis");

    let df = load_csv(&paths.cleaned_data)?;
    let report = EdaReport::compute(&df)?;
    for line in report.to_string().lines() {
        println!("  {}", line);
    }
    println!();
    Ok(())
}

pub fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    section("Data Info");

    let df = load_csv(data_path)?;
    let info = DatasetInfo::compute(&df)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), info.rows);
    println!("  {:<12} {}", muted("Columns"), info.columns.len());
    println!("  {:<12} {:.2} MB", muted("Memory"), df.estimated_size() as f64 / 1024.0 / 1024.0);
    println!();

    println!("  {:<26} {:<10} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(54)));

    for col in &info.columns {
        println!(
            "  {:<26} {:<10} {:>6} {:>8}",
            col.name,
            col.dtype.truecolor(140, 140, 140),
            col.null_count,
            col.n_unique
        );
    }

    println!();
    Ok(())
}

pub fn cmd_run(paths: &PipelinePaths, seed: u64) -> anyhow::Result<()> {
    cmd_preprocess(paths)?;
    cmd_engineer(paths)?;
    cmd_train(paths, seed, TrainerConfig::default().forest.n_estimators)
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(host: &str, port: u16, paths: PipelinePaths) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    println!();
    line_box_top();
    line_box_center(&format!("{}", "HR Attrition Dashboard".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_sep();
    line_box(&kv("Dashboard", &format!("http://{}:{}", host, port)));
    line_box(&kv("API      ", &format!("http://{}:{}/api", host, port)));
    line_box(&kv("Pipeline ", &paths.pipeline.display().to_string()));
    line_box_sep();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_bottom();
    println!();

    let config = ServerConfig::default().with_host(host).with_port(port);
    run_server(config, paths).await
}

//! Integration test: cleaned CSV → engineered CSV and encoder artifacts

mod common;

use hr_attrition::feature_engineering::FeatureEncoder;
use hr_attrition::preprocessing::{DataCleaner, LabelEncoder, StandardScaler};
use hr_attrition::utils::{load_artifact, load_csv};
use polars::prelude::*;

fn cleaned_paths(dir: &std::path::Path, n: usize) -> hr_attrition::config::PipelinePaths {
    let paths = common::write_raw(dir, n);
    DataCleaner::default()
        .run(&paths.raw_data, &paths.cleaned_data)
        .unwrap();
    paths
}

#[test]
fn test_run_writes_table_and_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let paths = cleaned_paths(dir.path(), 50);

    let summary = FeatureEncoder::new().run(&paths).unwrap();
    assert_eq!(summary.rows, 50);
    assert_eq!(summary.categorical_columns.len(), 7);
    assert!(summary.numeric_columns.iter().any(|c| c == "MonthlyIncome"));
    assert!(!summary.feature_names.iter().any(|c| c == "Attrition"));

    let engineered = load_csv(&paths.engineered_data).unwrap();
    let names: Vec<String> = engineered
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names.last().map(String::as_str), Some("Attrition"));
    assert_eq!(names.len(), summary.feature_names.len() + 1);

    let scaler: StandardScaler = load_artifact(&paths.scaler()).unwrap();
    assert!(scaler.is_fitted());
    let feature_names: Vec<String> = load_artifact(&paths.feature_names()).unwrap();
    assert_eq!(feature_names, summary.feature_names);
    let encoders: Vec<(String, LabelEncoder)> = load_artifact(&paths.label_encoders()).unwrap();
    assert_eq!(encoders.len(), 7);
}

#[test]
fn test_label_codes_follow_sorted_classes() {
    let dir = tempfile::tempdir().unwrap();
    let paths = cleaned_paths(dir.path(), 30);
    FeatureEncoder::new().run(&paths).unwrap();

    let encoders: Vec<(String, LabelEncoder)> = load_artifact(&paths.label_encoders()).unwrap();
    let (_, department) = encoders.iter().find(|(name, _)| name == "Department").unwrap();
    assert_eq!(
        department.classes(),
        &["Human Resources", "Research & Development", "Sales"]
    );
    assert_eq!(department.encode("Sales").unwrap(), 2);
}

#[test]
fn test_scaled_columns_are_centered() {
    let dir = tempfile::tempdir().unwrap();
    let paths = cleaned_paths(dir.path(), 40);
    FeatureEncoder::new().run(&paths).unwrap();

    let engineered = load_csv(&paths.engineered_data).unwrap();
    let age = engineered
        .column("Age")
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap();
    let mean = age.f64().unwrap().mean().unwrap();
    assert!(mean.abs() < 1e-9, "mean was {mean}");
}

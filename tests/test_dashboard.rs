//! Integration test: dashboard context over a trained pipeline

mod common;

use hr_attrition::dashboard::{ChartData, ChartKind, DashboardContext, RiskBand};
use hr_attrition::error::AttritionError;
use hr_attrition::feature_engineering::FeatureEncoder;
use hr_attrition::preprocessing::DataCleaner;
use hr_attrition::training::{Trainer, TrainerConfig};

#[test]
fn test_risk_band_thresholds() {
    assert_eq!(RiskBand::from_probability(0.39), RiskBand::Low);
    assert_eq!(RiskBand::from_probability(0.40), RiskBand::Medium);
    assert_eq!(RiskBand::from_probability(0.69), RiskBand::Medium);
    assert_eq!(RiskBand::from_probability(0.70), RiskBand::High);
}

#[test]
fn test_kpis_match_table() {
    let context = common::dashboard_context(90);
    let kpis = context.kpis();

    let positives = context
        .data()
        .column("Attrition")
        .unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .into_iter()
        .filter(|v| *v == Some(1))
        .count();
    assert_eq!(kpis.total_employees, 90);
    assert_eq!(kpis.attrition_count, positives);
    let expected_rate = positives as f64 / 90.0 * 100.0;
    assert!((kpis.attrition_rate - expected_rate).abs() < 1e-9);
}

#[test]
fn test_form_options_from_table() {
    let context = common::dashboard_context(60);
    let options = context.options();

    assert_eq!(options.categorical.len(), 7);
    assert_eq!(
        options.values("Department").unwrap(),
        &["Sales", "Research & Development", "Human Resources"]
    );
    assert_eq!(options.values("OverTime").unwrap(), &["Yes", "No"]);
    assert_eq!(options.numeric.len(), 5);
}

#[test]
fn test_predict_profile() {
    let context = common::dashboard_context(120);
    let prediction = context.predict(&common::sample_profile()).unwrap();

    assert!((0.0..=1.0).contains(&prediction.probability));
    assert_eq!(prediction.risk, RiskBand::from_probability(prediction.probability));
    assert_eq!(prediction.label, usize::from(prediction.probability > 0.5));
}

#[test]
fn test_predict_rejects_out_of_range() {
    let context = common::dashboard_context(60);
    let mut profile = common::sample_profile();
    profile.age = 75;
    assert!(matches!(
        context.predict(&profile),
        Err(AttritionError::InvalidInput(_))
    ));
}

#[test]
fn test_every_chart_computes() {
    let context = common::dashboard_context(60);
    for kind in ChartKind::ALL {
        let chart = context.chart(kind).unwrap();
        match (kind, chart) {
            (ChartKind::Department, ChartData::Counts { groups, .. }) => {
                assert_eq!(groups.len(), 3);
                let total: usize = groups.iter().map(|g| g.stayed + g.left).sum();
                assert_eq!(total, 60);
            }
            (ChartKind::Attrition, ChartData::Distribution { stayed, left, .. }) => {
                assert_eq!(stayed + left, 60);
            }
            (ChartKind::Age, ChartData::Box { distribution, .. }) => {
                assert_eq!(distribution.column, "Age");
            }
            _ => {}
        }
    }
}

#[test]
fn test_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let paths = common::write_raw(dir.path(), 100);
    DataCleaner::default()
        .run(&paths.raw_data, &paths.cleaned_data)
        .unwrap();
    FeatureEncoder::new().run(&paths).unwrap();
    Trainer::new(TrainerConfig::default().with_n_estimators(10))
        .run(&paths)
        .unwrap();

    let context = DashboardContext::load(&paths).unwrap();
    assert!(context.training_report().is_some());
    assert_eq!(context.kpis().total_employees, 100);
}

#[test]
fn test_load_without_report() {
    let dir = tempfile::tempdir().unwrap();
    let paths = common::write_raw(dir.path(), 80);
    DataCleaner::default()
        .run(&paths.raw_data, &paths.cleaned_data)
        .unwrap();
    Trainer::new(TrainerConfig::default().with_n_estimators(10))
        .run(&paths)
        .unwrap();
    std::fs::remove_file(paths.training_report()).unwrap();

    let context = DashboardContext::load(&paths).unwrap();
    assert!(context.training_report().is_none());
}

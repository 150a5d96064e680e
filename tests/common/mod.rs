//! Shared fixtures for the integration tests

#![allow(dead_code)]

use hr_attrition::config::PipelinePaths;
use hr_attrition::dashboard::EmployeeProfile;
use hr_attrition::utils::write_csv;
use polars::prelude::*;
use std::path::Path;

const DEPARTMENTS: [&str; 3] = ["Sales", "Research & Development", "Human Resources"];
const ROLES: [&str; 4] = [
    "Sales Executive",
    "Research Scientist",
    "Laboratory Technician",
    "Human Resources",
];
const TRAVEL: [&str; 3] = ["Travel_Rarely", "Travel_Frequently", "Non-Travel"];
const FIELDS: [&str; 3] = ["Life Sciences", "Medical", "Marketing"];
const MARITAL: [&str; 3] = ["Single", "Married", "Divorced"];

/// Raw HR table with the administrative columns and a learnable, noisy
/// target.
///
/// Young overtime workers and some dissatisfied ones leave; one row in seven
/// has its label flipped so no model separates the classes perfectly. Every
/// seventh `MonthlyIncome` is missing.
pub fn raw_hr_frame(n: usize) -> DataFrame {
    let age: Vec<i64> = (0..n).map(|i| 18 + ((i * 13) % 42) as i64).collect();
    let satisfaction: Vec<i64> = (0..n).map(|i| 1 + ((i * 5) % 4) as i64).collect();
    let overtime: Vec<&str> = (0..n).map(|i| if i % 3 == 0 { "Yes" } else { "No" }).collect();
    let attrition: Vec<&str> = (0..n)
        .map(|i| {
            let leaves = (overtime[i] == "Yes" && age[i] < 35) || (satisfaction[i] == 1 && i % 2 == 0);
            let flipped = i % 7 == 2;
            if leaves != flipped { "Yes" } else { "No" }
        })
        .collect();
    let income: Vec<Option<i64>> = (0..n)
        .map(|i| if i % 7 == 3 { None } else { Some(2000 + ((i * 977) % 15000) as i64) })
        .collect();

    df!(
        "Age" => age,
        "Attrition" => attrition,
        "BusinessTravel" => (0..n).map(|i| TRAVEL[i % 3]).collect::<Vec<_>>(),
        "Department" => (0..n).map(|i| DEPARTMENTS[i % 3]).collect::<Vec<_>>(),
        "EducationField" => (0..n).map(|i| FIELDS[(i / 2) % 3]).collect::<Vec<_>>(),
        "EmployeeCount" => vec![1i64; n],
        "EmployeeNumber" => (1..=n as i64).collect::<Vec<_>>(),
        "Gender" => (0..n).map(|i| if i % 2 == 0 { "Male" } else { "Female" }).collect::<Vec<_>>(),
        "JobRole" => (0..n).map(|i| ROLES[i % 4]).collect::<Vec<_>>(),
        "JobSatisfaction" => satisfaction,
        "MaritalStatus" => (0..n).map(|i| MARITAL[(i / 3) % 3]).collect::<Vec<_>>(),
        "MonthlyIncome" => income,
        "Over18" => vec!["Y"; n],
        "OverTime" => overtime,
        "StandardHours" => vec![80i64; n],
        "WorkLifeBalance" => (0..n).map(|i| 1 + ((i * 3) % 4) as i64).collect::<Vec<_>>(),
        "YearsAtCompany" => (0..n).map(|i| ((i * 11) % 25) as i64).collect::<Vec<_>>(),
    )
    .unwrap()
}

/// Write the raw table under `root` and return the rooted layout
pub fn write_raw(root: &Path, n: usize) -> PipelinePaths {
    let paths = PipelinePaths::rooted_at(root);
    let mut df = raw_hr_frame(n);
    write_csv(&mut df, &paths.raw_data).unwrap();
    paths
}

pub fn sample_profile() -> EmployeeProfile {
    EmployeeProfile {
        age: 30,
        monthly_income: 50000,
        years_at_company: 3,
        work_life_balance: 3,
        job_satisfaction: 3,
        business_travel: "Travel_Rarely".to_string(),
        department: "Sales".to_string(),
        education_field: "Medical".to_string(),
        gender: "Male".to_string(),
        job_role: "Sales Executive".to_string(),
        marital_status: "Single".to_string(),
        over_time: "Yes".to_string(),
    }
}

/// Dashboard context over a small freshly trained pipeline
pub fn dashboard_context(n: usize) -> hr_attrition::dashboard::DashboardContext {
    use hr_attrition::preprocessing::DataCleaner;
    use hr_attrition::training::{Trainer, TrainerConfig};

    let (cleaned, _) = DataCleaner::default().clean(&raw_hr_frame(n)).unwrap();
    let (pipeline, report) = Trainer::new(TrainerConfig::default().with_n_estimators(10))
        .fit(&cleaned)
        .unwrap();
    hr_attrition::dashboard::DashboardContext::new(pipeline, cleaned, Some(report)).unwrap()
}

//! Aggregates over the cleaned table: KPIs, chart data and the EDA report

use crate::error::{AttritionError, Result};
use crate::preprocessing::TARGET_COLUMN;
use crate::utils;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

fn target(df: &DataFrame) -> Result<Vec<usize>> {
    utils::column_f64(df, TARGET_COLUMN)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| match v {
            Some(x) if x == 0.0 => Ok(0),
            Some(x) if x == 1.0 => Ok(1),
            other => Err(AttritionError::UnknownTargetLabel {
                column: TARGET_COLUMN.to_string(),
                row,
                value: other.map(|x| x.to_string()),
            }),
        })
        .collect()
}

/// Headline numbers of the overview page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_employees: usize,
    pub attrition_count: usize,
    /// Percentage, 0-100
    pub attrition_rate: f64,
    pub avg_years_at_company: f64,
}

impl Kpis {
    pub fn compute(df: &DataFrame) -> Result<Self> {
        let y = target(df)?;
        let total = y.len();
        let left = y.iter().filter(|&&c| c == 1).count();
        let tenure: Vec<f64> = utils::column_f64(df, "YearsAtCompany")?
            .into_iter()
            .flatten()
            .collect();

        Ok(Self {
            total_employees: total,
            attrition_count: left,
            attrition_rate: if total == 0 {
                0.0
            } else {
                left as f64 / total as f64 * 100.0
            },
            avg_years_at_company: if tenure.is_empty() {
                0.0
            } else {
                tenure.iter().sum::<f64>() / tenure.len() as f64
            },
        })
    }
}

/// Stayed/left counts for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub stayed: usize,
    pub left: usize,
}

/// Count rows per category and attrition class; categories keep their
/// order of first appearance.
pub fn attrition_by(df: &DataFrame, column: &str) -> Result<Vec<CategoryCount>> {
    let y = target(df)?;
    let values = utils::column_str(df, column)?;

    let mut counts: Vec<CategoryCount> = Vec::new();
    for (value, class) in values.into_iter().zip(y) {
        let Some(value) = value else { continue };
        let entry = match counts.iter().position(|c| c.category == value) {
            Some(idx) => &mut counts[idx],
            None => {
                counts.push(CategoryCount {
                    category: value,
                    stayed: 0,
                    left: 0,
                });
                let last = counts.len() - 1;
                &mut counts[last]
            }
        };
        if class == 1 {
            entry.left += 1;
        } else {
            entry.stayed += 1;
        }
    }
    Ok(counts)
}

/// Box-plot summary: quartiles plus 1.5 IQR whiskers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: usize,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let q1 = utils::quantile(values, 0.25)?;
        let median = utils::quantile(values, 0.5)?;
        let q3 = utils::quantile(values, 0.75)?;
        let iqr = q3 - q1;
        let (lo, hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside: Vec<f64> = values.iter().copied().filter(|v| (lo..=hi).contains(v)).collect();
        let fold = |init: f64, f: fn(f64, f64) -> f64| values.iter().copied().fold(init, f);

        Some(Self {
            count: values.len(),
            min: fold(f64::INFINITY, f64::min),
            q1,
            median,
            q3,
            max: fold(f64::NEG_INFINITY, f64::max),
            lower_whisker: inside.iter().copied().fold(f64::INFINITY, f64::min),
            upper_whisker: inside.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            outliers: values.len() - inside.len(),
        })
    }
}

/// Distribution of one numeric column for each attrition class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDistribution {
    pub column: String,
    pub stayed: Option<BoxStats>,
    pub left: Option<BoxStats>,
}

pub fn distribution_by_attrition(df: &DataFrame, column: &str) -> Result<ClassDistribution> {
    let y = target(df)?;
    let values = utils::column_f64(df, column)?;

    let mut by_class: [Vec<f64>; 2] = [Vec::new(), Vec::new()];
    for (v, class) in values.into_iter().zip(y) {
        if let Some(v) = v {
            by_class[class].push(v);
        }
    }

    Ok(ClassDistribution {
        column: column.to_string(),
        stayed: BoxStats::from_values(&by_class[0]),
        left: BoxStats::from_values(&by_class[1]),
    })
}

/// Chart served by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Department,
    JobRole,
    Age,
    Income,
    Tenure,
    Attrition,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Department,
        ChartKind::JobRole,
        ChartKind::Age,
        ChartKind::Income,
        ChartKind::Tenure,
        ChartKind::Attrition,
    ];

    /// Parse the URL name of a chart
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ChartKind::Department => "department",
            ChartKind::JobRole => "job-role",
            ChartKind::Age => "age",
            ChartKind::Income => "income",
            ChartKind::Tenure => "tenure",
            ChartKind::Attrition => "attrition",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Department => "Attrition by Department",
            ChartKind::JobRole => "Attrition by Job Role",
            ChartKind::Age => "Age vs Attrition",
            ChartKind::Income => "Monthly Income vs Attrition",
            ChartKind::Tenure => "Years at Company vs Attrition",
            ChartKind::Attrition => "Employee Attrition Distribution",
        }
    }
}

/// Data behind one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Counts {
        title: String,
        column: String,
        groups: Vec<CategoryCount>,
    },
    Box {
        title: String,
        distribution: ClassDistribution,
    },
    Distribution {
        title: String,
        stayed: usize,
        left: usize,
    },
}

impl ChartData {
    pub fn compute(df: &DataFrame, kind: ChartKind) -> Result<Self> {
        let title = kind.title().to_string();
        let counts = |column: &str| -> Result<ChartData> {
            Ok(ChartData::Counts {
                title: title.clone(),
                column: column.to_string(),
                groups: attrition_by(df, column)?,
            })
        };
        let boxed = |column: &str| -> Result<ChartData> {
            Ok(ChartData::Box {
                title: title.clone(),
                distribution: distribution_by_attrition(df, column)?,
            })
        };

        match kind {
            ChartKind::Department => counts("Department"),
            ChartKind::JobRole => counts("JobRole"),
            ChartKind::Age => boxed("Age"),
            ChartKind::Income => boxed("MonthlyIncome"),
            ChartKind::Tenure => boxed("YearsAtCompany"),
            ChartKind::Attrition => {
                let y = target(df)?;
                let left = y.iter().filter(|&&c| c == 1).count();
                Ok(ChartData::Distribution {
                    title: kind.title().to_string(),
                    stayed: y.len() - left,
                    left,
                })
            }
        }
    }
}

/// The exploratory views printed by `hr-attrition eda`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdaReport {
    pub kpis: Kpis,
    pub charts: Vec<ChartData>,
}

impl EdaReport {
    pub fn compute(df: &DataFrame) -> Result<Self> {
        Ok(Self {
            kpis: Kpis::compute(df)?,
            charts: ChartKind::ALL
                .iter()
                .map(|&k| ChartData::compute(df, k))
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

fn write_box(f: &mut fmt::Formatter<'_>, label: &str, stats: &Option<BoxStats>) -> fmt::Result {
    match stats {
        Some(s) => writeln!(
            f,
            "  {:<8} n={:<5} min={:<10.1} q1={:<10.1} median={:<10.1} q3={:<10.1} max={:.1}",
            label, s.count, s.min, s.q1, s.median, s.q3, s.max
        ),
        None => writeln!(f, "  {:<8} no rows", label),
    }
}

impl fmt::Display for EdaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Employees: {}  Attrition: {} ({:.2}%)  Avg tenure: {:.1} years",
            self.kpis.total_employees,
            self.kpis.attrition_count,
            self.kpis.attrition_rate,
            self.kpis.avg_years_at_company
        )?;

        for chart in &self.charts {
            writeln!(f)?;
            match chart {
                ChartData::Counts { title, groups, .. } => {
                    writeln!(f, "{}", title)?;
                    for g in groups {
                        writeln!(f, "  {:<28} stayed={:<6} left={}", g.category, g.stayed, g.left)?;
                    }
                }
                ChartData::Box {
                    title,
                    distribution,
                } => {
                    writeln!(f, "{}", title)?;
                    write_box(f, "stayed", &distribution.stayed)?;
                    write_box(f, "left", &distribution.left)?;
                }
                ChartData::Distribution { title, stayed, left } => {
                    writeln!(f, "{}", title)?;
                    writeln!(f, "  0 (No)   {}", stayed)?;
                    writeln!(f, "  1 (Yes)  {}", left)?;
                }
            }
        }
        Ok(())
    }
}

/// Shape and per-column overview of a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
    pub n_unique: usize,
}

impl DatasetInfo {
    pub fn compute(df: &DataFrame) -> Result<Self> {
        let columns = df
            .get_columns()
            .iter()
            .map(|c| {
                Ok(ColumnInfo {
                    name: c.name().to_string(),
                    dtype: c.dtype().to_string(),
                    null_count: c.null_count(),
                    n_unique: c.as_materialized_series().n_unique()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rows: df.height(),
            columns,
        })
    }
}

//! Training configuration

use serde::{Deserialize, Serialize};

/// Numeric feature columns, standardized by the column transformer
pub const NUMERIC_COLUMNS: [&str; 5] = [
    "Age",
    "MonthlyIncome",
    "YearsAtCompany",
    "WorkLifeBalance",
    "JobSatisfaction",
];

/// Categorical feature columns, one-hot encoded by the column transformer
pub const CATEGORICAL_COLUMNS: [&str; 7] = [
    "BusinessTravel",
    "Department",
    "EducationField",
    "Gender",
    "JobRole",
    "MaritalStatus",
    "OverTime",
];

/// Candidate classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    LogisticRegression,
    RandomForest,
}

impl ModelType {
    pub fn name(&self) -> &'static str {
        match self {
            ModelType::LogisticRegression => "Logistic Regression",
            ModelType::RandomForest => "Random Forest",
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-class weighting used by the forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassWeight {
    /// Every sample weighs 1
    Uniform,
    /// `n_samples / (n_classes * class_count)`
    Balanced,
}

/// Logistic regression hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticConfig {
    /// Iteration cap for gradient descent
    pub max_iter: usize,
    pub learning_rate: f64,
    /// Inverse L2 regularization strength
    pub c: f64,
    /// Stop when the gradient norm drops below this
    pub tol: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            learning_rate: 0.5,
            c: 1.0,
            tol: 1e-6,
        }
    }
}

/// Random forest hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub bootstrap: bool,
    pub class_weight: ClassWeight,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            class_weight: ClassWeight::Balanced,
        }
    }
}

/// Configuration for the trainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Fraction of each class held out for evaluation
    pub test_size: f64,

    /// Seed for the split and the forest
    pub random_state: u64,

    /// Target column name
    pub target_column: String,

    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,

    pub logistic: LogisticConfig,
    pub forest: ForestConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
            target_column: crate::preprocessing::TARGET_COLUMN.to_string(),
            numeric_columns: NUMERIC_COLUMNS.iter().map(|s| s.to_string()).collect(),
            categorical_columns: CATEGORICAL_COLUMNS.iter().map(|s| s.to_string()).collect(),
            logistic: LogisticConfig::default(),
            forest: ForestConfig::default(),
        }
    }
}

impl TrainerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Builder method to set the seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set the forest size
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.forest.n_estimators = n;
        self
    }

    /// Builder method to cap logistic regression iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.logistic.max_iter = max_iter;
        self
    }

    /// Builder method to replace the column roles
    pub fn with_columns<N, C>(mut self, numeric: N, categorical: C) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.numeric_columns = numeric.into_iter().map(Into::into).collect();
        self.categorical_columns = categorical.into_iter().map(Into::into).collect();
        self
    }
}

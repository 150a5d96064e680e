//! Linear model implementations

use super::config::LogisticConfig;
use crate::error::{AttritionError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Logistic regression for binary classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Inverse L2 regularization strength; the penalty is `||w||^2 / (2C)`
    /// on the summed log-loss
    pub c: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance
    pub tol: f64,
    /// Learning rate
    pub learning_rate: f64,
    /// Iterations run by the last fit
    pub n_iter: usize,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self::from_config(&LogisticConfig::default())
    }

    pub fn from_config(config: &LogisticConfig) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            c: config.c,
            max_iter: config.max_iter,
            tol: config.tol,
            learning_rate: config.learning_rate,
            n_iter: 0,
        }
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    fn sigmoid(z: f64) -> f64 {
        if z >= 0.0 {
            1.0 / (1.0 + (-z).exp())
        } else {
            let e = z.exp();
            e / (1.0 + e)
        }
    }

    /// Fit with full-batch gradient descent; `y` holds 0/1 labels
    pub fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(AttritionError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(AttritionError::TrainingError(
                "cannot fit logistic regression on zero samples".to_string(),
            ));
        }
        if y.iter().any(|&c| c > 1) {
            return Err(AttritionError::TrainingError(
                "logistic regression expects binary labels".to_string(),
            ));
        }

        let y = Array1::from_iter(y.iter().map(|&c| c as f64));
        let n = n_samples as f64;
        let alpha = 1.0 / (self.c * n);

        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;
        self.n_iter = 0;

        for _ in 0..self.max_iter {
            self.n_iter += 1;
            let predictions = (x.dot(&weights) + bias).mapv(Self::sigmoid);

            let errors = &predictions - &y;
            let dw = x.t().dot(&errors) / n + alpha * &weights;
            let db = errors.sum() / n;

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - self.learning_rate * dw;
            bias -= self.learning_rate * db;
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        Ok(self)
    }

    /// Class probabilities, one `[p0, p1]` row per sample
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(AttritionError::ModelNotFitted)?;
        if x.ncols() != coefficients.len() {
            return Err(AttritionError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        let intercept = self.intercept.unwrap_or(0.0);

        let p1 = (x.dot(coefficients) + intercept).mapv(Self::sigmoid);
        let mut proba = Array2::zeros((x.nrows(), 2));
        for (i, &p) in p1.iter().enumerate() {
            proba[[i, 0]] = 1.0 - p;
            proba[[i, 1]] = p;
        }
        Ok(proba)
    }

    /// Class 1 when its probability is strictly above one half
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.column(1).mapv(|p| usize::from(p > 0.5)))
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }
}

//! Binary classification metrics

use crate::error::{AttritionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

fn check_lengths(a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(AttritionError::ShapeError {
            expected: format!("{} predictions", a),
            actual: format!("{} predictions", b),
        });
    }
    if a == 0 {
        return Err(AttritionError::InvalidInput("no samples to score".to_string()));
    }
    Ok(())
}

/// Fraction of exact matches
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Recall of class 1; 0 when there are no positives
pub fn recall(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let cm = ConfusionMatrix::compute(y_true, y_pred, 2)?;
    Ok(cm.recall(1))
}

/// Area under the ROC curve from the Mann-Whitney rank statistic, tied
/// scores sharing their average rank.
///
/// Undefined, and an error, when only one class is present.
pub fn roc_auc(y_true: &[usize], scores: &[f64]) -> Result<f64> {
    check_lengths(y_true.len(), scores.len())?;

    let n_pos = y_true.iter().filter(|&&c| c == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(AttritionError::InvalidInput(
            "ROC-AUC needs both classes in y_true".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; scores.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && scores[order[end + 1]] == scores[order[start]] {
            end += 1;
        }
        // ranks are 1-based; a run of ties gets the mean of its positions
        let avg = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = avg;
        }
        start = end + 1;
    }

    let pos_rank_sum: f64 = y_true
        .iter()
        .zip(&ranks)
        .filter(|(&c, _)| c == 1)
        .map(|(_, r)| r)
        .sum();
    let n_pos = n_pos as f64;
    Ok((pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg as f64))
}

/// Counts indexed `[actual][predicted]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn compute(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Result<Self> {
        check_lengths(y_true.len(), y_pred.len())?;
        let mut counts = vec![vec![0; n_classes]; n_classes];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t >= n_classes || p >= n_classes {
                return Err(AttritionError::InvalidInput(format!(
                    "label out of range for {} classes",
                    n_classes
                )));
            }
            counts[t][p] += 1;
        }
        Ok(Self { counts })
    }

    pub fn n_classes(&self) -> usize {
        self.counts.len()
    }

    /// Rows whose actual class is `class`
    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    pub fn precision(&self, class: usize) -> f64 {
        let predicted: usize = self.counts.iter().map(|row| row[class]).sum();
        ratio(self.counts[class][class], predicted)
    }

    pub fn recall(&self, class: usize) -> f64 {
        ratio(self.counts[class][class], self.support(class))
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Precision, recall, F1 and support of one class or average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics plus macro and support-weighted averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let classes: Vec<ClassMetrics> = (0..cm.n_classes())
            .map(|c| {
                let precision = cm.precision(c);
                let recall = cm.recall(c);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: c.to_string(),
                    precision,
                    recall,
                    f1,
                    support: cm.support(c),
                }
            })
            .collect();

        let total: usize = classes.iter().map(|m| m.support).sum();
        let correct: usize = (0..cm.n_classes()).map(|c| cm.counts[c][c]).sum();
        let k = classes.len().max(1) as f64;

        let macro_avg = ClassMetrics {
            label: "macro avg".to_string(),
            precision: classes.iter().map(|m| m.precision).sum::<f64>() / k,
            recall: classes.iter().map(|m| m.recall).sum::<f64>() / k,
            f1: classes.iter().map(|m| m.f1).sum::<f64>() / k,
            support: total,
        };

        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            label: "weighted avg".to_string(),
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
        };

        Self {
            accuracy: ratio(correct, total),
            classes,
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for m in &self.classes {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for m in [&self.macro_avg, &self.weighted_avg] {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_and_recall() {
        let y_true = [0, 0, 1, 1, 1];
        let y_pred = [0, 1, 1, 0, 1];
        assert!((accuracy(&y_true, &y_pred).unwrap() - 0.6).abs() < 1e-12);
        assert!((recall(&y_true, &y_pred).unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_perfect_and_inverted() {
        let y = [0, 0, 1, 1];
        assert_eq!(roc_auc(&y, &[0.1, 0.2, 0.8, 0.9]).unwrap(), 1.0);
        assert_eq!(roc_auc(&y, &[0.9, 0.8, 0.2, 0.1]).unwrap(), 0.0);
    }

    #[test]
    fn test_roc_auc_ties() {
        // every score tied: no discrimination
        let y = [0, 1, 0, 1];
        assert_eq!(roc_auc(&y, &[0.5; 4]).unwrap(), 0.5);

        // one positive tied with one negative
        let y = [0, 0, 1];
        assert!((roc_auc(&y, &[0.1, 0.4, 0.4]).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_single_class() {
        assert!(roc_auc(&[1, 1], &[0.2, 0.3]).is_err());
    }

    #[test]
    fn test_confusion_matrix() {
        let cm = ConfusionMatrix::compute(&[0, 0, 1, 1, 1], &[0, 1, 1, 0, 1], 2).unwrap();
        assert_eq!(cm.counts, vec![vec![1, 1], vec![1, 2]]);
        assert_eq!(cm.support(1), 3);
        assert!((cm.precision(1) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_classification_report() {
        let cm = ConfusionMatrix::compute(&[0, 0, 0, 1], &[0, 0, 1, 1], 2).unwrap();
        let report = ClassificationReport::from_confusion(&cm);

        assert_eq!(report.accuracy, 0.75);
        assert_eq!(report.classes[0].precision, 1.0);
        assert!((report.classes[0].recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.classes[1].precision, 0.5);
        assert_eq!(report.macro_avg.support, 4);
        assert!((report.weighted_avg.recall - 0.75).abs() < 1e-12);

        let text = report.to_string();
        assert!(text.contains("macro avg"));
        assert!(text.contains("weighted avg"));
    }

    #[test]
    fn test_zero_division() {
        let cm = ConfusionMatrix::compute(&[0, 0], &[0, 0], 2).unwrap();
        assert_eq!(cm.precision(1), 0.0);
        assert_eq!(cm.recall(1), 0.0);
    }
}

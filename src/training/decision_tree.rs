//! Weighted CART classification tree

use crate::error::{AttritionError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node holding the normalized weighted class distribution
    Leaf {
        distribution: Vec<f64>,
        n_samples: usize,
    },
    /// Internal node with split; `x <= threshold` goes left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Best split candidate found while scanning a node
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Classification tree grown on weighted Gini impurity.
///
/// At every node a random subset of `max_features` non-constant features is
/// examined, in the spirit of CART as used inside random forests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features examined per split, all when `None`
    pub max_features: Option<usize>,
    n_classes: usize,
    n_features: usize,
    /// Unnormalized weighted impurity decrease per feature
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            n_classes: 0,
            n_features: 0,
            feature_importances: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Set the number of features examined per split
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features.max(1));
        self
    }

    /// Fit on the rows in `indices`, each weighted by `sample_weight`.
    ///
    /// `y` holds class indices in `0..n_classes`.
    pub fn fit<R: Rng>(
        &mut self,
        x: &Array2<f64>,
        y: &[usize],
        sample_weight: &[f64],
        indices: &[usize],
        n_classes: usize,
        rng: &mut R,
    ) -> Result<&mut Self> {
        if x.nrows() != y.len() || y.len() != sample_weight.len() {
            return Err(AttritionError::ShapeError {
                expected: format!("{} labels and weights", x.nrows()),
                actual: format!("{} labels, {} weights", y.len(), sample_weight.len()),
            });
        }
        if indices.is_empty() {
            return Err(AttritionError::TrainingError(
                "cannot grow a tree on zero samples".to_string(),
            ));
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
            return Err(AttritionError::TrainingError(format!(
                "label {} out of range for {} classes",
                bad, n_classes
            )));
        }

        self.n_classes = n_classes;
        self.n_features = x.ncols();

        let mut importances = vec![0.0; self.n_features];
        let grower = Grower {
            tree: &*self,
            x,
            y,
            w: sample_weight,
        };
        let root = grower.build(indices.to_vec(), 0, &mut importances, rng);

        self.root = Some(root);
        self.feature_importances = Some(Array1::from_vec(importances));
        Ok(self)
    }

    /// Class distribution for every row of `x`
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let root = self.root.as_ref().ok_or(AttritionError::ModelNotFitted)?;
        self.check_width(x)?;

        let mut proba = Array2::zeros((x.nrows(), self.n_classes));
        for (i, row) in x.rows().into_iter().enumerate() {
            let dist = Self::leaf_distribution(root, row);
            for (c, p) in dist.iter().enumerate() {
                proba[[i, c]] = *p;
            }
        }
        Ok(proba)
    }

    /// Most probable class per row; ties go to the lower class index
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.rows().into_iter().map(|row| argmax(row)).collect())
    }

    fn leaf_distribution<'a>(node: &'a TreeNode, sample: ArrayView1<f64>) -> &'a [f64] {
        match node {
            TreeNode::Leaf { distribution, .. } => distribution,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
                ..
            } => {
                if sample[*feature_idx] <= *threshold {
                    Self::leaf_distribution(left, sample)
                } else {
                    Self::leaf_distribution(right, sample)
                }
            }
        }
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features {
            return Err(AttritionError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        fn leaves(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => leaves(left) + leaves(right),
            }
        }
        self.root.as_ref().map_or(0, leaves)
    }
}

/// Index of the largest value; the first one wins ties
pub(crate) fn argmax(row: ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}

fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|&c| (c / total).powi(2)).sum::<f64>()
}

/// Borrowed training state for one `fit` call
struct Grower<'a> {
    tree: &'a DecisionTree,
    x: &'a Array2<f64>,
    y: &'a [usize],
    w: &'a [f64],
}

impl Grower<'_> {
    fn class_weights(&self, indices: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.tree.n_classes];
        for &i in indices {
            counts[self.y[i]] += self.w[i];
        }
        counts
    }

    fn leaf(&self, counts: &[f64], n_samples: usize) -> TreeNode {
        let total: f64 = counts.iter().sum();
        let distribution = if total > 0.0 {
            counts.iter().map(|c| c / total).collect()
        } else {
            vec![1.0 / self.tree.n_classes as f64; self.tree.n_classes]
        };
        TreeNode::Leaf {
            distribution,
            n_samples,
        }
    }

    fn build<R: Rng>(
        &self,
        indices: Vec<usize>,
        depth: usize,
        importances: &mut [f64],
        rng: &mut R,
    ) -> TreeNode {
        let n_samples = indices.len();
        let counts = self.class_weights(&indices);
        let total: f64 = counts.iter().sum();
        let impurity = gini(&counts, total);

        let should_stop = n_samples < self.tree.min_samples_split
            || n_samples < 2 * self.tree.min_samples_leaf
            || self.tree.max_depth.map_or(false, |d| depth >= d)
            || impurity <= 1e-12;

        if should_stop {
            return self.leaf(&counts, n_samples);
        }

        let Some(best) = self.find_best_split(&indices, &counts, total, impurity, rng) else {
            return self.leaf(&counts, n_samples);
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[[i, best.feature_idx]] <= best.threshold);

        importances[best.feature_idx] += total * best.gain;

        let left = Box::new(self.build(left_idx, depth + 1, importances, rng));
        let right = Box::new(self.build(right_idx, depth + 1, importances, rng));

        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
            n_samples,
            impurity,
        }
    }

    fn find_best_split<R: Rng>(
        &self,
        indices: &[usize],
        parent_counts: &[f64],
        total: f64,
        parent_impurity: f64,
        rng: &mut R,
    ) -> Option<SplitCandidate> {
        let n_features = self.tree.n_features;
        let max_features = self.tree.max_features.unwrap_or(n_features).min(n_features);

        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0;

        for feature_idx in features {
            if visited >= max_features {
                break;
            }

            let mut order: Vec<usize> = indices.to_vec();
            order.sort_by(|&a, &b| {
                self.x[[a, feature_idx]]
                    .partial_cmp(&self.x[[b, feature_idx]])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let first = self.x[[order[0], feature_idx]];
            let last = self.x[[order[order.len() - 1], feature_idx]];
            if last <= first {
                // constant features do not count against max_features
                continue;
            }
            visited += 1;

            let mut left_counts = vec![0.0; self.tree.n_classes];
            let mut left_total = 0.0;
            let min_leaf = self.tree.min_samples_leaf;

            for pos in 0..order.len() - 1 {
                let i = order[pos];
                left_counts[self.y[i]] += self.w[i];
                left_total += self.w[i];

                let value = self.x[[i, feature_idx]];
                let next = self.x[[order[pos + 1], feature_idx]];
                let n_left = pos + 1;
                if next <= value || n_left < min_leaf || order.len() - n_left < min_leaf {
                    continue;
                }

                let right_counts: Vec<f64> = parent_counts
                    .iter()
                    .zip(&left_counts)
                    .map(|(p, l)| p - l)
                    .collect();
                let right_total = total - left_total;

                let weighted = (left_total * gini(&left_counts, left_total)
                    + right_total * gini(&right_counts, right_total))
                    / total;
                let gain = parent_impurity - weighted;

                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    let mut threshold = (value + next) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

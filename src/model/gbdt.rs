//! Multiclass gradient-boosted decision trees.
//!
//! Each boosting round fits one regression tree per class to the softmax
//! residuals, shrunk by the learning rate. Validation log-loss is tracked
//! per round and training stops early after a configured number of rounds
//! without improvement. Trees split on positional feature indices, so the
//! model is tied to the feature-vector contract it was trained under.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SemtokError};
use crate::model::{GbdtParams, TrainingStats};

/// A trained multiclass boosted-tree model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gbdt {
    params: GbdtParams,
    n_classes: usize,
    n_features: usize,
    /// `trees[round][class]`.
    trees: Vec<Vec<RegressionTree>>,
    training_stats: Option<TrainingStats>,
}

impl Gbdt {
    pub fn new(params: GbdtParams, n_classes: usize, n_features: usize) -> Self {
        Gbdt {
            params,
            n_classes,
            n_features,
            trees: Vec::new(),
            training_stats: None,
        }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn training_stats(&self) -> Option<&TrainingStats> {
        self.training_stats.as_ref()
    }

    /// Train on a feature matrix and label vector, with a held-out fold for
    /// early stopping.
    ///
    /// Labels must lie in `0..n_classes`. The training set must not be
    /// empty; the validation set may be (early stopping then degrades to
    /// the round bound alone).
    pub fn fit(
        &mut self,
        train_x: &[Vec<f32>],
        train_y: &[i32],
        val_x: &[Vec<f32>],
        val_y: &[i32],
    ) -> Result<()> {
        if train_x.is_empty() {
            return Err(SemtokError::training("training set is empty"));
        }
        if train_x.len() != train_y.len() || val_x.len() != val_y.len() {
            return Err(SemtokError::training("feature/label length mismatch"));
        }
        for &label in train_y.iter().chain(val_y) {
            if label < 0 || label as usize >= self.n_classes {
                return Err(SemtokError::training(format!(
                    "label {label} outside 0..{}",
                    self.n_classes
                )));
            }
        }
        for row in train_x.iter().chain(val_x) {
            if row.len() != self.n_features {
                return Err(SemtokError::training(format!(
                    "feature row has {} values, expected {}",
                    row.len(),
                    self.n_features
                )));
            }
        }

        self.trees.clear();
        self.training_stats = None;

        let start = std::time::Instant::now();
        let mut train_scores = vec![vec![0.0f64; self.n_classes]; train_x.len()];
        let mut val_scores = vec![vec![0.0f64; self.n_classes]; val_x.len()];

        let mut training_losses = Vec::new();
        let mut validation_losses = Vec::new();
        let mut best_val_loss = f64::INFINITY;
        let mut rounds_without_improvement = 0;
        let mut early_stopped = false;

        for round in 0..self.params.max_rounds {
            let mut round_trees = Vec::with_capacity(self.n_classes);

            for class in 0..self.n_classes {
                // Softmax residuals: one-hot target minus predicted
                // probability for this class.
                let residuals: Vec<f64> = train_scores
                    .iter()
                    .zip(train_y)
                    .map(|(scores, &label)| {
                        let target = if label as usize == class { 1.0 } else { 0.0 };
                        target - softmax(scores)[class]
                    })
                    .collect();

                let tree = RegressionTree::fit(
                    train_x,
                    &residuals,
                    self.params.max_depth,
                    self.params.min_samples_split,
                );

                for (scores, row) in train_scores.iter_mut().zip(train_x) {
                    scores[class] += self.params.learning_rate * tree.predict(row);
                }
                for (scores, row) in val_scores.iter_mut().zip(val_x) {
                    scores[class] += self.params.learning_rate * tree.predict(row);
                }

                round_trees.push(tree);
            }

            self.trees.push(round_trees);

            let train_loss = log_loss(&train_scores, train_y);
            training_losses.push(train_loss);

            if val_x.is_empty() {
                continue;
            }

            let val_loss = log_loss(&val_scores, val_y);
            validation_losses.push(val_loss);
            log::debug!(
                "round {round}: train_loss={train_loss:.6} val_loss={val_loss:.6}"
            );

            if val_loss + 1e-9 < best_val_loss {
                best_val_loss = val_loss;
                rounds_without_improvement = 0;
            } else {
                rounds_without_improvement += 1;
                if rounds_without_improvement >= self.params.early_stopping_rounds {
                    log::info!(
                        "early stopping at round {round} (best val_loss {best_val_loss:.6})"
                    );
                    early_stopped = true;
                    break;
                }
            }
        }

        self.training_stats = Some(TrainingStats {
            training_losses,
            validation_losses,
            rounds: self.trees.len(),
            early_stopped,
            training_time_ms: start.elapsed().as_millis() as u64,
        });

        Ok(())
    }

    /// Per-class probabilities for one feature row.
    pub fn predict_proba(&self, row: &[f32]) -> Vec<f64> {
        let mut scores = vec![0.0f64; self.n_classes];
        for round_trees in &self.trees {
            for (class, tree) in round_trees.iter().enumerate() {
                scores[class] += self.params.learning_rate * tree.predict(row);
            }
        }
        softmax(&scores)
    }

    /// Most probable class for one feature row.
    pub fn predict(&self, row: &[f32]) -> i32 {
        let probs = self.predict_proba(row);
        probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(class, _)| class as i32)
            .unwrap_or(0)
    }
}

/// Numerically stable softmax.
fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}

/// Multiclass log-loss of raw scores against labels.
fn log_loss(scores: &[Vec<f64>], labels: &[i32]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let total: f64 = scores
        .iter()
        .zip(labels)
        .map(|(row, &label)| {
            let p = softmax(row)[label as usize].max(1e-15);
            -p.ln()
        })
        .sum();
    total / labels.len() as f64
}

/// A regression tree over positional `f32` features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Option<Box<TreeNode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TreeNode {
    /// Feature index for the split; `-1` marks a leaf.
    feature_idx: i32,
    threshold: f64,
    /// Prediction value for leaf nodes.
    value: f64,
    left: Option<Box<TreeNode>>,
    right: Option<Box<TreeNode>>,
}

impl RegressionTree {
    /// Fit a tree to per-sample targets.
    fn fit(x: &[Vec<f32>], targets: &[f64], max_depth: usize, min_samples_split: usize) -> Self {
        let indices: Vec<usize> = (0..x.len()).collect();
        let root = Self::build_tree(x, targets, &indices, 0, max_depth, min_samples_split);
        RegressionTree { root }
    }

    fn leaf(targets: &[f64], indices: &[usize]) -> Option<Box<TreeNode>> {
        if indices.is_empty() {
            return None;
        }
        let value = indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64;
        Some(Box::new(TreeNode {
            feature_idx: -1,
            threshold: 0.0,
            value,
            left: None,
            right: None,
        }))
    }

    fn build_tree(
        x: &[Vec<f32>],
        targets: &[f64],
        indices: &[usize],
        depth: usize,
        max_depth: usize,
        min_samples_split: usize,
    ) -> Option<Box<TreeNode>> {
        if indices.is_empty() {
            return None;
        }
        if depth >= max_depth || indices.len() < min_samples_split {
            return Self::leaf(targets, indices);
        }

        match Self::find_best_split(x, targets, indices) {
            Some((feature_idx, threshold, left_indices, right_indices)) => {
                let left =
                    Self::build_tree(x, targets, &left_indices, depth + 1, max_depth, min_samples_split);
                let right =
                    Self::build_tree(x, targets, &right_indices, depth + 1, max_depth, min_samples_split);

                Some(Box::new(TreeNode {
                    feature_idx: feature_idx as i32,
                    threshold,
                    value: 0.0,
                    left,
                    right,
                }))
            }
            None => Self::leaf(targets, indices),
        }
    }

    /// Greedy best split: for every feature, sort the node's samples by
    /// value and evaluate each midpoint threshold by variance-reduction
    /// gain (sum² / n on each side).
    fn find_best_split(
        x: &[Vec<f32>],
        targets: &[f64],
        indices: &[usize],
    ) -> Option<(usize, f64, Vec<usize>, Vec<usize>)> {
        let n_features = x[indices[0]].len();
        let mut best_gain = f64::NEG_INFINITY;
        let mut best_split = None;

        for feature_idx in 0..n_features {
            let mut values: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (x[i][feature_idx] as f64, i))
                .collect();
            values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            for i in 1..values.len() {
                // Equal neighbors would produce a split that separates
                // nothing.
                if values[i - 1].0 == values[i].0 {
                    continue;
                }
                let threshold = (values[i - 1].0 + values[i].0) / 2.0;

                let left_indices: Vec<usize> = values[..i].iter().map(|&(_, idx)| idx).collect();
                let right_indices: Vec<usize> = values[i..].iter().map(|&(_, idx)| idx).collect();

                let gain = Self::gain(targets, &left_indices, &right_indices);
                if gain > best_gain {
                    best_gain = gain;
                    best_split = Some((feature_idx, threshold, left_indices, right_indices));
                }
            }
        }

        best_split
    }

    fn gain(targets: &[f64], left: &[usize], right: &[usize]) -> f64 {
        if left.is_empty() || right.is_empty() {
            return f64::NEG_INFINITY;
        }
        let left_sum: f64 = left.iter().map(|&i| targets[i]).sum();
        let right_sum: f64 = right.iter().map(|&i| targets[i]).sum();
        left_sum * left_sum / left.len() as f64 + right_sum * right_sum / right.len() as f64
    }

    fn predict(&self, row: &[f32]) -> f64 {
        match &self.root {
            Some(root) => Self::predict_node(root, row),
            None => 0.0,
        }
    }

    fn predict_node(node: &TreeNode, row: &[f32]) -> f64 {
        if node.feature_idx < 0 {
            return node.value;
        }

        let feature_value = row
            .get(node.feature_idx as usize)
            .copied()
            .unwrap_or(0.0) as f64;

        if feature_value <= node.threshold {
            match &node.left {
                Some(left) => Self::predict_node(left, row),
                None => node.value,
            }
        } else {
            match &node.right {
                Some(right) => Self::predict_node(right, row),
                None => node.value,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well-separated classes on the first feature.
    fn separable_data() -> (Vec<Vec<f32>>, Vec<i32>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            x.push(vec![i as f32 * 0.01, 1.0]);
            y.push(0);
            x.push(vec![1.0 + i as f32 * 0.01, 0.0]);
            y.push(1);
        }
        (x, y)
    }

    fn fast_params() -> GbdtParams {
        GbdtParams {
            learning_rate: 0.3,
            max_rounds: 20,
            max_depth: 3,
            min_samples_split: 2,
            early_stopping_rounds: 5,
        }
    }

    #[test]
    fn test_fit_separates_classes() {
        let (x, y) = separable_data();
        let mut model = Gbdt::new(fast_params(), 2, 2);
        model.fit(&x, &y, &[], &[]).unwrap();

        assert!(model.is_trained());
        assert_eq!(model.predict(&[0.05, 1.0]), 0);
        assert_eq!(model.predict(&[1.05, 0.0]), 1);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = separable_data();
        let mut model = Gbdt::new(fast_params(), 2, 2);
        model.fit(&x, &y, &[], &[]).unwrap();

        let probs = model.predict_proba(&[0.5, 0.5]);
        assert_eq!(probs.len(), 2);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_early_stopping_records_stats() {
        let (x, y) = separable_data();
        let (vx, vy) = separable_data();
        let mut model = Gbdt::new(fast_params(), 2, 2);
        model.fit(&x, &y, &vx, &vy).unwrap();

        let stats = model.training_stats().unwrap();
        assert!(stats.rounds > 0);
        assert!(stats.rounds <= 20);
        assert_eq!(stats.training_losses.len(), stats.rounds);
    }

    #[test]
    fn test_empty_training_set_rejected() {
        let mut model = Gbdt::new(fast_params(), 2, 2);
        assert!(model.fit(&[], &[], &[], &[]).is_err());
    }

    #[test]
    fn test_out_of_range_label_rejected() {
        let mut model = Gbdt::new(fast_params(), 2, 2);
        let x = vec![vec![0.0, 0.0]];
        assert!(model.fit(&x, &[5], &[], &[]).is_err());
    }

    #[test]
    fn test_model_round_trips_through_json() {
        let (x, y) = separable_data();
        let mut model = Gbdt::new(fast_params(), 2, 2);
        model.fit(&x, &y, &[], &[]).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let restored: Gbdt = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.predict(&[0.05, 1.0]), model.predict(&[0.05, 1.0]));
    }
}

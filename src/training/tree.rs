//! Regression tree shared by the forest and boosting models
//!
//! Splits minimize sum of squared errors; leaves predict the mean target.
//! On 0/1 labels the leaf mean is a probability estimate, which is how the
//! forest uses it.

use crate::error::{BiobeatError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Tree growth limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, sample: &[f64]) -> f64 {
        match self {
            Node::Leaf { value } => *value,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if sample[*feature] <= *threshold {
                    left.predict(sample)
                } else {
                    right.predict(sample)
                }
            }
        }
    }
}

/// CART-style regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    config: TreeConfig,
    root: Option<Node>,
    n_features: usize,
    split_counts: Vec<f64>,
}

impl RegressionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_features: 0,
            split_counts: Vec::new(),
        }
    }

    /// Fit on all features.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let features: Vec<usize> = (0..x.ncols()).collect();
        self.fit_with_features(x, y, &features)
    }

    /// Fit considering only the given feature indices at every split.
    pub fn fit_with_features(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        features: &[usize],
    ) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(BiobeatError::ShapeError {
                expected: format!("{} targets", x.nrows()),
                actual: format!("{}", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(BiobeatError::TrainingError(
                "cannot fit a tree on zero samples".to_string(),
            ));
        }

        self.n_features = x.ncols();
        self.split_counts = vec![0.0; x.ncols()];

        let indices: Vec<usize> = (0..x.nrows()).collect();
        let root = self.build_node(x, y, &indices, features, 0);
        self.root = Some(root);
        Ok(())
    }

    /// Predict a single row.
    pub fn predict_row(&self, sample: &[f64]) -> f64 {
        match &self.root {
            Some(root) => root.predict(sample),
            None => 0.0,
        }
    }

    /// Predict all rows.
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        let mut preds = Array1::zeros(x.nrows());
        for (i, row) in x.rows().into_iter().enumerate() {
            preds[i] = match row.as_slice() {
                Some(s) => self.predict_row(s),
                None => self.predict_row(&row.to_vec()),
            };
        }
        preds
    }

    /// How often each feature was chosen for a split.
    pub fn split_counts(&self) -> &[f64] {
        &self.split_counts
    }

    fn build_node(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        features: &[usize],
        depth: usize,
    ) -> Node {
        let n = indices.len();
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / n as f64;

        if depth >= self.config.max_depth || n < self.config.min_samples_split {
            return Node::Leaf { value: mean };
        }

        let best = features
            .iter()
            .filter_map(|&f| self.best_split_for_feature(x, y, indices, f))
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            Some((feature, threshold, reduction)) if reduction > 1e-12 => {
                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
                    indices.iter().partition(|&&i| x[[i, feature]] <= threshold);

                if left_idx.len() < self.config.min_samples_leaf
                    || right_idx.len() < self.config.min_samples_leaf
                {
                    return Node::Leaf { value: mean };
                }

                self.split_counts[feature] += 1.0;
                let left = self.build_node(x, y, &left_idx, features, depth + 1);
                let right = self.build_node(x, y, &right_idx, features, depth + 1);

                Node::Split {
                    feature,
                    threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            _ => Node::Leaf { value: mean },
        }
    }

    /// Best threshold for one feature by SSE reduction, using prefix sums
    /// over the value-sorted order.
    fn best_split_for_feature(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        feature: usize,
    ) -> Option<(usize, f64, f64)> {
        let n = indices.len();
        if n < 2 * self.config.min_samples_leaf {
            return None;
        }

        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

        let total_sum: f64 = sorted.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = sorted.iter().map(|&i| y[i] * y[i]).sum();
        let parent_sse = total_sq - total_sum * total_sum / n as f64;

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        let mut best: Option<(usize, f64, f64)> = None;

        for (pos, &idx) in sorted.iter().enumerate() {
            left_sum += y[idx];
            left_sq += y[idx] * y[idx];

            let n_left = pos + 1;
            let n_right = n - n_left;
            if n_right == 0 {
                break;
            }
            if n_left < self.config.min_samples_leaf || n_right < self.config.min_samples_leaf {
                continue;
            }

            // No split between identical feature values
            let next_idx = sorted[pos + 1];
            if x[[idx, feature]] == x[[next_idx, feature]] {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let left_sse = left_sq - left_sum * left_sum / n_left as f64;
            let right_sse = right_sq - right_sum * right_sum / n_right as f64;
            let reduction = parent_sse - left_sse - right_sse;

            let improves = match best {
                Some((_, _, r)) => reduction > r,
                None => true,
            };
            if improves {
                let threshold = (x[[idx, feature]] + x[[next_idx, feature]]) / 2.0;
                best = Some((feature, threshold, reduction));
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec((8, 1), vec![1.0, 2.0, 3.0, 4.0, 10.0, 11.0, 12.0, 13.0])
            .unwrap();
        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        (x, y)
    }

    #[test]
    fn test_tree_learns_step_function() {
        let (x, y) = step_data();
        let mut tree = RegressionTree::new(TreeConfig::default());
        tree.fit(&x, &y).unwrap();

        assert!(tree.predict_row(&[2.5]) < 0.5);
        assert!(tree.predict_row(&[11.5]) > 0.5);
    }

    #[test]
    fn test_constant_target_single_leaf() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = Array1::from_vec(vec![3.0, 3.0, 3.0, 3.0]);

        let mut tree = RegressionTree::new(TreeConfig::default());
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.predict_row(&[100.0]), 3.0);
        assert!(tree.split_counts().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let (x, y) = step_data();
        let mut tree = RegressionTree::new(TreeConfig {
            min_samples_leaf: 5,
            ..Default::default()
        });
        tree.fit(&x, &y).unwrap();
        // 8 samples cannot split into two leaves of >= 5
        assert_eq!(tree.predict_row(&[1.0]), 0.5);
    }

    #[test]
    fn test_empty_input_errors() {
        let x = Array2::<f64>::zeros((0, 2));
        let y = Array1::<f64>::zeros(0);
        let mut tree = RegressionTree::new(TreeConfig::default());
        assert!(tree.fit(&x, &y).is_err());
    }
}

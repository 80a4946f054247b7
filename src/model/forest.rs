//! Bagged CART regression trees.
//!
//! Each tree is grown on a bootstrap resample of the training rows, splitting
//! on the feature/threshold pair with the largest squared-error reduction.
//! All features are considered at every split (bagging-only randomization);
//! the only randomness is the bootstrap, driven by a per-tree seed derived
//! from the run seed. That makes training deterministic regardless of how
//! rayon schedules the per-tree work.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::ForestParams;
use crate::error::AppError;

/// Odd constant for decorrelating per-tree seeds (splitmix64 increment).
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

/// A single regression tree stored as a flat node arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

impl RandomForest {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        params: &ForestParams,
        seed: u64,
    ) -> Result<Self, AppError> {
        let n_features = validate_matrix(x, y)?;
        if params.n_trees == 0 {
            return Err(AppError::input("Forest must have at least one tree."));
        }

        let trees: Vec<Tree> = (0..params.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_seed = seed ^ (i as u64).wrapping_add(1).wrapping_mul(SEED_MIX);
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let sample: Vec<usize> = (0..x.len()).map(|_| rng.gen_range(0..x.len())).collect();
                Tree::grow(x, y, sample, params)
            })
            .collect();

        Ok(Self { n_features, trees })
    }

    /// Predict one row as the mean of the per-tree predictions.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        sum / self.trees.len() as f64
    }
}

fn validate_matrix(x: &[Vec<f64>], y: &[f64]) -> Result<usize, AppError> {
    let first = x
        .first()
        .ok_or_else(|| AppError::no_data("Cannot fit a forest on an empty matrix."))?;
    let n_features = first.len();
    if n_features == 0 {
        return Err(AppError::no_data("Cannot fit a forest with zero feature columns."));
    }
    if x.iter().any(|r| r.len() != n_features) {
        return Err(AppError::internal("Ragged training matrix (row lengths differ)."));
    }
    if x.len() != y.len() {
        return Err(AppError::internal(format!(
            "Training matrix has {} rows but target has {} values.",
            x.len(),
            y.len()
        )));
    }
    Ok(n_features)
}

impl Tree {
    fn grow(x: &[Vec<f64>], y: &[f64], sample: Vec<usize>, params: &ForestParams) -> Self {
        let mut nodes = Vec::new();
        build_node(&mut nodes, x, y, sample, 0, params);
        Self { nodes }
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let v = row.get(*feature).copied().unwrap_or(0.0);
                    idx = if v <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Recursively grow a subtree; returns the index of its root node.
fn build_node(
    nodes: &mut Vec<Node>,
    x: &[Vec<f64>],
    y: &[f64],
    indices: Vec<usize>,
    depth: usize,
    params: &ForestParams,
) -> usize {
    let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;

    let stop = depth >= params.max_depth || indices.len() < params.min_samples_split;
    let split = if stop {
        None
    } else {
        best_split(x, y, &indices, params.min_samples_leaf)
    };

    let Some((feature, threshold)) = split else {
        nodes.push(Node::Leaf { value: mean });
        return nodes.len() - 1;
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| x[i][feature] <= threshold);

    // Reserve the split node slot before recursing so children land after it.
    nodes.push(Node::Leaf { value: mean });
    let node_idx = nodes.len() - 1;

    let left = build_node(nodes, x, y, left_idx, depth + 1, params);
    let right = build_node(nodes, x, y, right_idx, depth + 1, params);
    nodes[node_idx] = Node::Split {
        feature,
        threshold,
        left,
        right,
    };
    node_idx
}

/// Find the feature/threshold pair with the largest SSE reduction.
///
/// For each feature we sort the sampled targets by feature value and scan
/// every boundary between distinct values, computing left/right SSE from
/// running sums. Returns `None` when no split satisfies the leaf-size
/// minimum or reduces error (for example all targets equal).
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    min_leaf: usize,
) -> Option<(usize, f64)> {
    let n = indices.len();
    if n < 2 * min_leaf {
        return None;
    }

    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sum2: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let total_sse = total_sum2 - total_sum * total_sum / n as f64;
    if total_sse <= 0.0 {
        return None;
    }

    let n_features = x[indices[0]].len();
    let mut best: Option<(f64, usize, f64)> = None; // (sse, feature, threshold)

    let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);
    for feature in 0..n_features {
        pairs.clear();
        pairs.extend(indices.iter().map(|&i| (x[i][feature], y[i])));
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut left_sum = 0.0;
        let mut left_sum2 = 0.0;
        for k in 1..n {
            let (v, t) = pairs[k - 1];
            left_sum += t;
            left_sum2 += t * t;

            if k < min_leaf || n - k < min_leaf {
                continue;
            }
            // Can't split between equal feature values.
            if v >= pairs[k].0 {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sum2 = total_sum2 - left_sum2;
            let left_sse = left_sum2 - left_sum * left_sum / k as f64;
            let right_sse = right_sum2 - right_sum * right_sum / (n - k) as f64;
            let sse = left_sse + right_sse;

            let better = match best {
                Some((best_sse, _, _)) => sse < best_sse,
                None => sse < total_sse,
            };
            if better {
                best = Some((sse, feature, (v + pairs[k].0) / 2.0));
            }
        }
    }

    best.map(|(_, feature, threshold)| (feature, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        // Step function: y = 10 for x < 5, y = 50 for x >= 5.
        let x: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64 / 10.0]).collect();
        let y: Vec<f64> = x.iter().map(|r| if r[0] < 5.0 { 10.0 } else { 50.0 }).collect();
        (x, y)
    }

    #[test]
    fn forest_learns_a_step_function() {
        let (x, y) = step_data();
        let params = ForestParams { n_trees: 20, ..ForestParams::default() };
        let forest = RandomForest::fit(&x, &y, &params, 42).unwrap();

        assert!((forest.predict_row(&[2.0]) - 10.0).abs() < 5.0);
        assert!((forest.predict_row(&[8.0]) - 50.0).abs() < 5.0);
    }

    #[test]
    fn training_is_deterministic_for_a_fixed_seed() {
        let (x, y) = step_data();
        let params = ForestParams { n_trees: 10, ..ForestParams::default() };
        let a = RandomForest::fit(&x, &y, &params, 7).unwrap();
        let b = RandomForest::fit(&x, &y, &params, 7).unwrap();

        for row in &x {
            assert_eq!(a.predict_row(row), b.predict_row(row));
        }
    }

    #[test]
    fn different_seeds_produce_different_forests() {
        let (x, y) = step_data();
        let params = ForestParams { n_trees: 10, ..ForestParams::default() };
        let a = RandomForest::fit(&x, &y, &params, 1).unwrap();
        let b = RandomForest::fit(&x, &y, &params, 2).unwrap();

        let differs = x.iter().any(|row| a.predict_row(row) != b.predict_row(row));
        assert!(differs, "distinct seeds should bootstrap differently");
    }

    #[test]
    fn constant_target_yields_single_leaf_trees() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let y = vec![42.0; 20];
        let params = ForestParams { n_trees: 3, ..ForestParams::default() };
        let forest = RandomForest::fit(&x, &y, &params, 0).unwrap();
        assert!((forest.predict_row(&[5.0]) - 42.0).abs() < 1e-12);
    }

    #[test]
    fn fit_rejects_shape_errors() {
        let params = ForestParams::default();
        assert!(RandomForest::fit(&[], &[], &params, 0).is_err());
        assert!(RandomForest::fit(&[vec![1.0]], &[1.0, 2.0], &params, 0).is_err());
        assert!(RandomForest::fit(&[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0], &params, 0).is_err());
    }
}

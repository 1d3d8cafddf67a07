// ============================================================
// Layer 5 — Regression Tree
// ============================================================
// A CART regression tree grown by exact split search:
//
//   for every candidate feature
//     sort the node's rows by that feature
//     sweep left → right keeping running sums of y
//     score each boundary between two distinct values by the
//     reduction in squared error
//
// Nodes live in a flat Vec and reference children by index,
// which keeps the tree trivially serialisable with serde.
// Rows go left when `value < threshold`; the threshold is the
// midpoint between the two values either side of the split.
//
// Why grow our own trees?
//   The model only needs CART regression with bootstrap and
//   feature subsampling. Owning the node layout keeps the
//   artifact a plain serde document we fully control.
//
// Reference: Breiman et al., Classification and Regression Trees
//            Rust Book §8 (Vectors)

use ndarray::{ArrayView1, ArrayView2};
use rand::{rngs::StdRng, seq::index};
use serde::{Deserialize, Serialize};

// ─── Parameters ───────────────────────────────────────────────────────────────

/// How many features each split may look at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    All,
    Sqrt,
    /// Share of the features in (0, 1].
    Fraction(f64),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::All         => n_features,
            MaxFeatures::Sqrt        => (n_features as f64).sqrt().round() as usize,
            MaxFeatures::Fraction(f) => ((n_features as f64) * f).round() as usize,
        };
        k.clamp(1, n_features.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth:         Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    pub max_features:      MaxFeatures,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth:         None,
            min_samples_split: 2,
            min_samples_leaf:  1,
            max_features:      MaxFeatures::All,
        }
    }
}

// ─── Nodes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitCondition {
    pub feature:   usize,
    pub threshold: f64,
}

impl SplitCondition {
    #[inline]
    pub fn go_left(&self, value: f64) -> bool {
        value < self.threshold || value.is_nan()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Split { condition: SplitCondition, left: usize, right: usize },
    Leaf { value: f64, samples: usize },
}

// ─── RegressionTree ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes:      Vec<Node>,
    n_features: usize,
    /// Total squared-error reduction credited to each feature.
    importance: Vec<f64>,
}

impl RegressionTree {
    /// Grow a tree on the given rows of `x` (duplicates allowed, as
    /// produced by bootstrap sampling). `rows` must not be empty.
    pub fn fit(
        x:      ArrayView2<'_, f64>,
        y:      &[f64],
        rows:   &mut [usize],
        params: &TreeParams,
        rng:    &mut StdRng,
    ) -> Self {
        let mut builder = Builder {
            x: x.view(),
            y,
            params,
            nodes:      Vec::new(),
            importance: vec![0.0; x.ncols()],
        };
        builder.grow(rows, 0, rng);
        Self {
            nodes:      builder.nodes,
            n_features: x.ncols(),
            importance: builder.importance,
        }
    }

    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value, .. } => return *value,
                Node::Split { condition, left, right } => {
                    idx = if condition.go_left(row[condition.feature]) { *left } else { *right };
                }
            }
        }
    }

    pub fn n_features(&self) -> usize { self.n_features }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    pub fn importance(&self) -> &[f64] { &self.importance }

    /// Structural check for trees read back from disk. Children must
    /// point forward so a corrupted file cannot make predict loop.
    pub fn verify(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { value, .. } if !value.is_finite() => {
                    return Err(format!("node {idx}: non-finite leaf value"));
                }
                Node::Split { condition, left, right } => {
                    if condition.feature >= self.n_features {
                        return Err(format!("node {idx}: feature {} out of range", condition.feature));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {idx}: bad child index {child}"));
                        }
                    }
                }
                Node::Leaf { .. } => {}
            }
        }
        Ok(())
    }
}

// ─── Builder ──────────────────────────────────────────────────────────────────

struct Builder<'a> {
    x:          ArrayView2<'a, f64>,
    y:          &'a [f64],
    params:     &'a TreeParams,
    nodes:      Vec<Node>,
    importance: Vec<f64>,
}

struct BestSplit {
    condition: SplitCondition,
    gain:      f64,
}

impl Builder<'_> {
    /// Grow the subtree for `rows`; returns its node index.
    fn grow(&mut self, rows: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        let n     = rows.len();
        let sum   = rows.iter().map(|&r| self.y[r]).sum::<f64>();
        let value = sum / n as f64;

        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { value, samples: n });

        let depth_reached = self.params.max_depth.map_or(false, |d| depth >= d);
        if depth_reached
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf
        {
            return idx;
        }

        let Some(best) = self.best_split(rows, rng) else {
            return idx;
        };

        // In-place partition: rows going left end up in front
        let mut mid = 0;
        for i in 0..n {
            if best.condition.go_left(self.x[[rows[i], best.condition.feature]]) {
                rows.swap(i, mid);
                mid += 1;
            }
        }
        self.importance[best.condition.feature] += best.gain;

        let (left_rows, right_rows) = rows.split_at_mut(mid);
        let left  = self.grow(left_rows, depth + 1, rng);
        let right = self.grow(right_rows, depth + 1, rng);
        self.nodes[idx] = Node::Split { condition: best.condition, left, right };
        idx
    }

    fn best_split(&self, rows: &[usize], rng: &mut StdRng) -> Option<BestSplit> {
        let n_features = self.x.ncols();
        let k          = self.params.max_features.resolve(n_features);
        let mut candidates: Vec<usize> = if k >= n_features {
            (0..n_features).collect()
        } else {
            index::sample(rng, n_features, k).into_vec()
        };
        candidates.sort_unstable();

        let n         = rows.len() as f64;
        let total_sum = rows.iter().map(|&r| self.y[r]).sum::<f64>();
        let total_sq  = rows.iter().map(|&r| self.y[r] * self.y[r]).sum::<f64>();
        let parent    = total_sum * total_sum / n;
        let parent_sse = total_sq - parent;

        // Pure node, or only rounding noise left
        let min_gain = parent_sse.abs().max(1.0) * 1e-12;
        if parent_sse <= min_gain {
            return None;
        }

        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<BestSplit> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(rows.len());

        for feature in candidates {
            pairs.clear();
            pairs.extend(rows.iter().map(|&r| (self.x[[r, feature]], self.y[r])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            for i in 0..pairs.len() - 1 {
                left_sum += pairs[i].1;
                let left_n  = i + 1;
                let right_n = pairs.len() - left_n;
                if pairs[i].0 == pairs[i + 1].0 || left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let score = left_sum * left_sum / left_n as f64
                          + right_sum * right_sum / right_n as f64;
                let gain  = score - parent;

                if gain > min_gain && best.as_ref().map_or(true, |b| gain > b.gain) {
                    let (lo, hi) = (pairs[i].0, pairs[i + 1].0);
                    let mid      = lo + (hi - lo) / 2.0;
                    let threshold = if mid > lo { mid } else { hi };
                    best = Some(BestSplit {
                        condition: SplitCondition { feature, threshold },
                        gain,
                    });
                }
            }
        }

        best
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use rand::SeedableRng;

    fn fit(x: &Array2<f64>, y: &[f64], params: &TreeParams) -> RegressionTree {
        let mut rows: Vec<usize> = (0..y.len()).collect();
        let mut rng = StdRng::seed_from_u64(0);
        RegressionTree::fit(x.view(), y, &mut rows, params, &mut rng)
    }

    #[test]
    fn test_step_function_is_learned_exactly() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0]];
        let y = [5.0, 5.0, 5.0, 20.0, 20.0];
        let tree = fit(&x, &y, &TreeParams::default());
        assert_eq!(tree.predict_row(array![2.5].view()), 5.0);
        assert_eq!(tree.predict_row(array![12.0].view()), 20.0);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
        assert!(tree.verify().is_ok());
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x = array![[1.0, 0.0], [2.0, 1.0], [3.0, 0.0]];
        let tree = fit(&x, &[7.0, 7.0, 7.0], &TreeParams::default());
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict_row(array![100.0, 1.0].view()), 7.0);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x = Array2::from_shape_fn((16, 1), |(i, _)| i as f64);
        let y: Vec<f64> = (0..16).map(|i| (i * i) as f64).collect();
        let params = TreeParams { max_depth: Some(2), ..TreeParams::default() };
        let tree = fit(&x, &y, &params);
        assert!(tree.depth() <= 2);
        assert!(tree.n_leaves() <= 4);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let x = Array2::from_shape_fn((10, 1), |(i, _)| i as f64);
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let params = TreeParams { min_samples_leaf: 3, ..TreeParams::default() };
        let tree = fit(&x, &y, &params);
        for node in &tree.nodes {
            if let Node::Leaf { samples, .. } = node {
                assert!(*samples >= 3);
            }
        }
    }

    #[test]
    fn test_importance_goes_to_informative_feature() {
        // Column 0 is noise, column 1 decides the target
        let x = array![[3.0, 0.0], [1.0, 0.0], [2.0, 1.0], [4.0, 1.0]];
        let tree = fit(&x, &[10.0, 10.0, 50.0, 50.0], &TreeParams::default());
        assert!(tree.importance()[1] > 0.0);
        assert_eq!(tree.importance()[0], 0.0);
    }

    #[test]
    fn test_verify_rejects_backward_child() {
        let tree = RegressionTree {
            nodes: vec![Node::Split {
                condition: SplitCondition { feature: 0, threshold: 1.0 },
                left:  0,
                right: 0,
            }],
            n_features: 1,
            importance: vec![0.0],
        };
        assert!(tree.verify().is_err());
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::All.resolve(9), 9);
        assert_eq!(MaxFeatures::Sqrt.resolve(9), 3);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(9), 5);
        assert_eq!(MaxFeatures::Fraction(0.01).resolve(9), 1);
    }
}

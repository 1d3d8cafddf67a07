// ============================================================
// Layer 5 — Random Forest Regressor
// ============================================================
// Bagged ensemble of RegressionTrees. Each tree:
//   1. draws a bootstrap sample of the training rows
//      (n draws with replacement)
//   2. grows a full CART tree on that sample, optionally
//      looking at a random subset of features per split
//
// Prediction is the mean of the trees' outputs.
//
// Tree t uses its own StdRng seeded from (seed, t), so the
// whole forest is reproducible from one seed.

use anyhow::{bail, Result};
use ndarray::{ArrayView1, ArrayView2};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::ml::regressor::Regressor;
use crate::ml::tree::{RegressionTree, TreeParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees:   usize,
    pub bootstrap: bool,
    pub seed:      u64,
    pub tree:      TreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees:   100,
            bootstrap: true,
            seed:      42,
            tree:      TreeParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees:      Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForestRegressor {
    pub fn trees(&self) -> &[RegressionTree] { &self.trees }

    /// Mean decrease in squared error per feature, normalised to sum to 1.
    /// All zeros when no tree ever split.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            let tree_total: f64 = tree.importance().iter().sum();
            if tree_total <= 0.0 {
                continue;
            }
            for (acc, imp) in totals.iter_mut().zip(tree.importance()) {
                *acc += imp / tree_total;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    pub fn verify(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            if tree.n_features() != self.n_features {
                return Err(format!(
                    "tree {i} expects {} features, forest expects {}",
                    tree.n_features(),
                    self.n_features
                ));
            }
            tree.verify().map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }
}

impl Regressor for RandomForestRegressor {
    type Params = ForestParams;

    fn fit(x: ArrayView2<'_, f64>, y: &[f64], params: &ForestParams) -> Result<Self> {
        let n = x.nrows();
        if n == 0 {
            bail!("cannot fit a forest on zero rows");
        }
        if n != y.len() {
            bail!("feature rows ({n}) and targets ({}) differ in length", y.len());
        }
        if params.n_trees == 0 {
            bail!("n_trees must be at least 1");
        }

        let mut trees = Vec::with_capacity(params.n_trees);
        for t in 0..params.n_trees {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(t as u64));
            let mut rows: Vec<usize> = if params.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            trees.push(RegressionTree::fit(x, y, &mut rows, &params.tree, &mut rng));
        }

        let forest = Self { trees, n_features: x.ncols() };
        tracing::debug!(
            "Forest fit: {} trees, mean depth {:.1}, mean leaves {:.1}",
            forest.trees.len(),
            forest.trees.iter().map(|t| t.depth() as f64).sum::<f64>() / forest.trees.len() as f64,
            forest.trees.iter().map(|t| t.n_leaves() as f64).sum::<f64>() / forest.trees.len() as f64,
        );
        Ok(forest)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        total / self.trees.len() as f64
    }
}

//! Random forest fitting
//!
//! Each tree gets its own bootstrap sample and RNG stream derived from
//! `(seed, tree index)`. Trees are grown in parallel with rayon and collected
//! in index order, so the result does not depend on the thread count.

use croprec_core::{RandomForest, Tree};
use rayon::prelude::*;
use tracing::debug;

use crate::cart::{CartBuilder, GrownTree, TreeConfig};
use crate::deterministic::{derive_seed, LcgRng};
use crate::errors::{Result, TrainerError};

/// Forest hyperparameters
#[derive(Clone, Debug, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// `None` uses floor(sqrt(n_features)), at least 1
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

impl ForestParams {
    fn tree_config(&self, n_features: usize) -> TreeConfig {
        let max_features = self
            .max_features
            .unwrap_or_else(|| ((n_features as f64).sqrt().floor() as usize).max(1));
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features,
        }
    }
}

/// Fits a [`RandomForest`] on scaled features and encoded labels
pub struct ForestTrainer {
    params: ForestParams,
}

impl ForestTrainer {
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize], n_classes: usize) -> Result<RandomForest> {
        if self.params.n_trees == 0 {
            return Err(TrainerError::Training("n_trees must be at least 1".to_string()));
        }
        if features.is_empty() {
            return Err(TrainerError::Training(
                "cannot fit a forest on zero rows".to_string(),
            ));
        }

        let n_features = features[0].len();
        let config = self.params.tree_config(n_features);
        let builder = CartBuilder::new(features, labels, n_classes, &config)?;
        let n_rows = features.len();

        debug!(
            "Growing {} trees over {} rows (max_features={})",
            self.params.n_trees, n_rows, config.max_features
        );

        let grown: Vec<GrownTree> = (0..self.params.n_trees)
            .into_par_iter()
            .map(|idx| {
                let mut rng = LcgRng::new(derive_seed(self.params.seed, idx as u64));
                let sample: Vec<usize> = (0..n_rows).map(|_| rng.next_range(n_rows)).collect();
                builder.build(&sample, &mut rng)
            })
            .collect::<Result<_>>()?;

        let importances = average_importances(&grown, n_features);
        let trees: Vec<Tree> = grown.into_iter().map(|g| g.tree).collect();

        Ok(RandomForest::new(trees, n_features, n_classes, importances))
    }
}

/// Normalize each tree's importances, average across trees, renormalize
fn average_importances(grown: &[GrownTree], n_features: usize) -> Vec<f64> {
    let mut total = vec![0.0; n_features];
    for tree in grown {
        let sum: f64 = tree.importances.iter().sum();
        if sum > 0.0 {
            for (acc, value) in total.iter_mut().zip(&tree.importances) {
                *acc += value / sum;
            }
        }
    }

    let sum: f64 = total.iter().sum();
    if sum > 0.0 {
        for value in &mut total {
            *value /= sum;
        }
    }
    total
}

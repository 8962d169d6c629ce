//! CART classification tree builder
//!
//! Exact-greedy Gini splits over a bootstrap sample. Candidate features at
//! each node are drawn from the tree's own RNG stream, so a tree is a pure
//! function of (data, sample, config, seed).

use croprec_core::forest::majority;
use croprec_core::{Node, Tree};

use crate::deterministic::LcgRng;
use crate::errors::{Result, TrainerError};

/// Smallest weighted impurity decrease accepted as a real split
const MIN_DECREASE: f64 = 1e-12;

/// Training parameters for a single tree
#[derive(Clone, Debug, PartialEq)]
pub struct TreeConfig {
    /// `None` grows until leaves are pure or too small to split
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined per node
    pub max_features: usize,
}

impl TreeConfig {
    /// Unbounded depth, examining every feature at every node
    pub fn exhaustive(n_features: usize) -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: n_features,
        }
    }
}

/// A fitted tree plus its raw impurity decrease per feature
#[derive(Clone, Debug)]
pub struct GrownTree {
    pub tree: Tree,
    pub importances: Vec<f64>,
}

/// Best split found at a node
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    /// n * parent_gini - (n_left * left_gini + n_right * right_gini)
    decrease: f64,
}

/// Build a classification tree using the exact-greedy CART algorithm
pub struct CartBuilder<'a> {
    config: &'a TreeConfig,
    features: &'a [Vec<f64>],
    labels: &'a [usize],
    n_classes: usize,
    n_features: usize,
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        features: &'a [Vec<f64>],
        labels: &'a [usize],
        n_classes: usize,
        config: &'a TreeConfig,
    ) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(TrainerError::Training(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if let Some(&bad) = labels.iter().find(|&&code| code >= n_classes) {
            return Err(TrainerError::Training(format!(
                "label code {bad} out of range for {n_classes} classes"
            )));
        }
        if config.min_samples_leaf == 0 || config.min_samples_split < 2 {
            return Err(TrainerError::Training(
                "min_samples_leaf must be >= 1 and min_samples_split >= 2".to_string(),
            ));
        }

        let n_features = features.first().map(Vec::len).unwrap_or(0);
        if features.iter().any(|row| row.len() != n_features) {
            return Err(TrainerError::Training(
                "feature rows have inconsistent widths".to_string(),
            ));
        }
        if config.max_features == 0 || config.max_features > n_features.max(1) {
            return Err(TrainerError::Training(format!(
                "max_features must be in 1..={n_features}, got {}",
                config.max_features
            )));
        }

        Ok(Self {
            config,
            features,
            labels,
            n_classes,
            n_features,
        })
    }

    /// Grow a tree over `sample` (row indices, repeats allowed)
    pub fn build(&self, sample: &[usize], rng: &mut LcgRng) -> Result<GrownTree> {
        if sample.is_empty() {
            return Err(TrainerError::Training(
                "cannot grow a tree from an empty sample".to_string(),
            ));
        }

        let mut nodes = Vec::new();
        let mut importances = vec![0.0; self.n_features];
        self.build_node(sample.to_vec(), 0, &mut nodes, &mut importances, rng);

        Ok(GrownTree {
            tree: Tree::new(nodes),
            importances,
        })
    }

    /// Recursively build tree nodes, returning the index of the new node
    fn build_node(
        &self,
        indices: Vec<usize>,
        depth: usize,
        nodes: &mut Vec<Node>,
        importances: &mut [f64],
        rng: &mut LcgRng,
    ) -> i32 {
        let current_idx = nodes.len() as i32;
        let counts = self.class_counts(&indices);
        let leaf_class = majority(&counts) as u32;

        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if is_pure
            || depth_reached
            || indices.len() < self.config.min_samples_split
            || indices.len() < 2 * self.config.min_samples_leaf
        {
            nodes.push(Node::leaf(current_idx, leaf_class));
            return current_idx;
        }

        let split = match self.find_best_split(&indices, &counts, rng) {
            Some(s) => s,
            None => {
                nodes.push(Node::leaf(current_idx, leaf_class));
                return current_idx;
            }
        };

        importances[split.feature_idx] += split.decrease;

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&idx| self.features[idx][split.feature_idx] <= split.threshold);

        // Reserve space for current node; children are patched in below
        nodes.push(Node::internal(
            current_idx,
            split.feature_idx as i32,
            split.threshold,
            -1,
            -1,
        ));

        let left = self.build_node(left_indices, depth + 1, nodes, importances, rng);
        let right = self.build_node(right_indices, depth + 1, nodes, importances, rng);

        let node = &mut nodes[current_idx as usize];
        node.left = left;
        node.right = right;

        current_idx
    }

    /// Features to examine at this node: a random subset of the non-constant
    /// ones, evaluated in ascending index order
    fn candidate_features(&self, indices: &[usize], rng: &mut LcgRng) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.n_features).collect();
        rng.shuffle(&mut order);

        let mut chosen: Vec<usize> = order
            .into_iter()
            .filter(|&f| !self.is_constant(indices, f))
            .take(self.config.max_features)
            .collect();
        chosen.sort_unstable();
        chosen
    }

    fn is_constant(&self, indices: &[usize], feature_idx: usize) -> bool {
        let first = self.features[indices[0]][feature_idx];
        indices
            .iter()
            .all(|&idx| self.features[idx][feature_idx] == first)
    }

    /// Find best split; ties keep the lowest (feature, threshold)
    fn find_best_split(
        &self,
        indices: &[usize],
        counts: &[u32],
        rng: &mut LcgRng,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let parent = n as f64 * gini(counts, n);
        let min_leaf = self.config.min_samples_leaf;
        let mut best: Option<SplitCandidate> = None;

        for feature_idx in self.candidate_features(indices, rng) {
            let mut column: Vec<(f64, usize)> = indices
                .iter()
                .map(|&idx| (self.features[idx][feature_idx], self.labels[idx]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            let mut left = vec![0u32; self.n_classes];
            let mut right = counts.to_vec();

            for pos in 0..n - 1 {
                let (value, class) = column[pos];
                left[class] += 1;
                right[class] -= 1;

                let next = column[pos + 1].0;
                if value == next {
                    continue;
                }
                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let children =
                    n_left as f64 * gini(&left, n_left) + n_right as f64 * gini(&right, n_right);
                let decrease = parent - children;
                let floor = best.as_ref().map_or(MIN_DECREASE, |b| b.decrease);
                if decrease > floor {
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold: midpoint(value, next),
                        decrease,
                    });
                }
            }
        }

        best
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<u32> {
        let mut counts = vec![0u32; self.n_classes];
        for &idx in indices {
            counts[self.labels[idx]] += 1;
        }
        counts
    }
}

/// Gini impurity of a class histogram
fn gini(counts: &[u32], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Threshold between two adjacent distinct values; never rounds up to `hi`
fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo + (hi - lo) / 2.0;
    if mid >= hi {
        lo
    } else {
        mid
    }
}

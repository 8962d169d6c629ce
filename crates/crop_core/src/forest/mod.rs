//! Random forest classifier inference
//!
//! The forest is an ensemble of classification trees over the scaled
//! feature space. Each tree votes for one class code; the forest returns the
//! code with the most votes, breaking ties towards the lowest code.
//!
//! # Model Format
//!
//! Forests are serialized as canonical JSON:
//!
//! ```json
//! {
//!   "feature_importances": [0.1, 0.1, 0.1, 0.2, 0.2, 0.1, 0.2],
//!   "n_classes": 3,
//!   "n_features": 7,
//!   "trees": [
//!     {"nodes": [
//!       {"feature_idx":6,"id":0,"leaf":null,"left":1,"right":2,"threshold":0.41},
//!       {"feature_idx":-1,"id":1,"leaf":0,"left":-1,"right":-1,"threshold":0.0},
//!       {"feature_idx":-1,"id":2,"leaf":2,"left":-1,"right":-1,"threshold":0.0}
//!     ]}
//!   ],
//!   "version": 1
//! }
//! ```

pub mod tree;

pub use tree::{Node, Tree};

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Current classifier format version
pub const FOREST_FORMAT_VERSION: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RandomForest {
    /// Format version (always 1 for now)
    pub version: i32,

    /// Width of the scaled feature vector
    pub n_features: usize,

    /// Number of class codes the leaves may hold
    pub n_classes: usize,

    /// Trees in the ensemble
    pub trees: Vec<Tree>,

    /// Mean decrease in impurity per feature, normalized to sum to 1
    pub feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(
        trees: Vec<Tree>,
        n_features: usize,
        n_classes: usize,
        feature_importances: Vec<f64>,
    ) -> Self {
        Self {
            version: FOREST_FORMAT_VERSION,
            n_features,
            n_classes,
            trees,
            feature_importances,
        }
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<()> {
        if self.version != FOREST_FORMAT_VERSION {
            return Err(CoreError::IncompatibleArtifact(format!(
                "Unsupported classifier version: {}",
                self.version
            )));
        }
        if self.trees.is_empty() {
            return Err(CoreError::IncompatibleArtifact(
                "classifier has no trees".to_string(),
            ));
        }
        if self.n_classes == 0 {
            return Err(CoreError::IncompatibleArtifact(
                "classifier has no classes".to_string(),
            ));
        }
        if self.feature_importances.len() != self.n_features {
            return Err(CoreError::IncompatibleArtifact(format!(
                "classifier has {} importances for {} features",
                self.feature_importances.len(),
                self.n_features
            )));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes).map_err(|e| {
                CoreError::IncompatibleArtifact(format!("Tree {} validation failed: {}", i, e))
            })?;
        }

        Ok(())
    }

    /// Vote counts per class code for one scaled sample
    pub fn votes(&self, features: &[f64]) -> Result<Vec<u32>> {
        if features.len() != self.n_features {
            return Err(CoreError::InvalidInput(format!(
                "classifier expects {} features, got {}",
                self.n_features,
                features.len()
            )));
        }

        let mut votes = vec![0u32; self.n_classes];
        for (i, tree) in self.trees.iter().enumerate() {
            let class = tree
                .evaluate(features)
                .filter(|class| (*class as usize) < self.n_classes)
                .ok_or_else(|| {
                    CoreError::IncompatibleArtifact(format!("tree {i} produced no valid class"))
                })?;
            votes[class as usize] += 1;
        }
        Ok(votes)
    }

    /// Majority-vote class code for one scaled sample
    pub fn predict(&self, features: &[f64]) -> Result<usize> {
        let votes = self.votes(features)?;
        Ok(majority(&votes))
    }

    /// Fraction of rows whose prediction matches the expected code
    pub fn accuracy(&self, rows: &[Vec<f64>], expected: &[usize]) -> Result<f64> {
        if rows.len() != expected.len() {
            return Err(CoreError::InvalidParameters(format!(
                "{} rows but {} labels",
                rows.len(),
                expected.len()
            )));
        }
        if rows.is_empty() {
            return Err(CoreError::InvalidParameters(
                "cannot score an empty evaluation set".to_string(),
            ));
        }

        let mut correct = 0usize;
        for (row, want) in rows.iter().zip(expected) {
            if self.predict(row)? == *want {
                correct += 1;
            }
        }
        Ok(correct as f64 / rows.len() as f64)
    }
}

/// Index of the largest count, lowest index on ties
pub fn majority(counts: &[u32]) -> usize {
    let mut best = 0usize;
    for (idx, count) in counts.iter().enumerate() {
        if *count > counts[best] {
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stumps() -> RandomForest {
        let t1 = Tree::new(vec![
            Node::internal(0, 0, 0.0, 1, 2),
            Node::leaf(1, 0),
            Node::leaf(2, 1),
        ]);
        let t2 = Tree::new(vec![
            Node::internal(0, 1, 0.0, 1, 2),
            Node::leaf(1, 0),
            Node::leaf(2, 2),
        ]);
        RandomForest::new(vec![t1, t2], 2, 3, vec![0.5, 0.5])
    }

    #[test]
    fn test_majority_ties_go_low() {
        assert_eq!(majority(&[1, 3, 3]), 1);
        assert_eq!(majority(&[2, 2, 0]), 0);
        assert_eq!(majority(&[0, 0, 1]), 2);
    }

    #[test]
    fn test_forest_vote() {
        let forest = two_stumps();
        assert!(forest.validate().is_ok());

        assert_eq!(forest.votes(&[-1.0, -1.0]).unwrap(), vec![2, 0, 0]);
        assert_eq!(forest.predict(&[-1.0, -1.0]).unwrap(), 0);
        // One vote each for 1 and 2
        assert_eq!(forest.predict(&[1.0, 1.0]).unwrap(), 1);
        // One vote each for 0 and 2
        assert_eq!(forest.predict(&[-1.0, 1.0]).unwrap(), 0);
    }

    #[test]
    fn test_wrong_width_is_input_error() {
        let forest = two_stumps();
        assert!(matches!(
            forest.predict(&[1.0]),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_accuracy() {
        let forest = two_stumps();
        let rows = vec![vec![-1.0, -1.0], vec![1.0, 1.0], vec![1.0, -1.0]];
        let acc = forest.accuracy(&rows, &[0, 1, 2]).unwrap();
        assert!((acc - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_validation_catches_shape_errors() {
        let mut forest = two_stumps();
        forest.n_classes = 2;
        assert!(forest.validate().is_err());

        let mut forest = two_stumps();
        forest.feature_importances.push(0.0);
        assert!(forest.validate().is_err());

        let mut forest = two_stumps();
        forest.version = 2;
        assert!(forest.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_preserves_thresholds() {
        let mut forest = two_stumps();
        forest.trees[0].nodes[0].threshold = 0.1 + 0.2;

        let json = crate::serde_canon::to_canonical_json(&forest).unwrap();
        let restored: RandomForest = serde_json::from_str(&json).unwrap();
        assert_eq!(forest, restored);
    }
}

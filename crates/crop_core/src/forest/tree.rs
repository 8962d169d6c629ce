//! Decision tree structures for forest inference
//!
//! Nodes are stored in a flat vector with node 0 as the root. Traversal goes
//! left when `feature <= threshold`.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// For internal nodes:
/// - `feature_idx >= 0`: index into the scaled feature vector
/// - `left` and `right` point to child node indices
/// - `leaf` is `None`
///
/// For leaf nodes:
/// - `feature_idx == -1`
/// - `leaf` holds the majority class code of the training rows that reached it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Node ID (position in the tree, not used in traversal)
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    pub feature_idx: i32,

    /// Split threshold in scaled feature space
    pub threshold: f64,

    /// Class code (Some for leaf nodes, None for internal nodes)
    pub leaf: Option<u32>,
}

impl Node {
    /// Create a new internal (split) node
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    /// Create a new leaf node
    pub fn leaf(id: i32, class: u32) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(class),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// A single classification tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Walk from the root to a leaf and return its class code
    ///
    /// Returns `None` only for structurally broken trees, which
    /// [`Tree::validate`] rejects at load time.
    pub fn evaluate(&self, features: &[f64]) -> Option<u32> {
        let mut idx = 0usize;

        // A valid tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(idx)?;

            if node.is_leaf() {
                return node.leaf;
            }

            let value = *features.get(node.feature_idx as usize)?;
            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };

            if next < 0 {
                return None;
            }
            idx = next as usize;
        }

        None
    }

    /// Validate structure against the feature and class counts it will be used with
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        let len = self.nodes.len() as i32;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                match node.leaf {
                    None => return Err(format!("Leaf node {i} has no class")),
                    Some(class) if class as usize >= n_classes => {
                        return Err(format!(
                            "Leaf node {i} has class {class} outside 0..{n_classes}"
                        ))
                    }
                    Some(_) => {}
                }
                continue;
            }

            // Children are always written after their parent, which rules out cycles.
            if node.left <= i as i32 || node.left >= len {
                return Err(format!("Node {} has invalid left child: {}", i, node.left));
            }
            if node.right <= i as i32 || node.right >= len {
                return Err(format!("Node {} has invalid right child: {}", i, node.right));
            }
            if node.feature_idx < 0 || node.feature_idx as usize >= n_features {
                return Err(format!(
                    "Internal node {} has invalid feature index: {}",
                    i, node.feature_idx
                ));
            }
            if !node.threshold.is_finite() {
                return Err(format!("Internal node {i} has a non-finite threshold"));
            }
        }

        Ok(())
    }
}

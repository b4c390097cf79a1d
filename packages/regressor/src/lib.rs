#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The pre-trained depth-to-water regression forest.
//!
//! Training happens elsewhere; this crate loads the exported artifact,
//! validates it against the shared feature schema, and evaluates it.
//! Prediction is a pure function of the loaded artifact — the mean of the
//! per-tree outputs — so a loaded forest can be shared freely across
//! concurrent predictions.

use std::path::Path;

use aquifer_map_earthdata::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating the forest artifact.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Artifact file missing or unreadable.
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Artifact JSON malformed.
    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// Artifact feature names differ from the shared schema.
    #[error("model schema mismatch at position {index}: expected {expected}, found {found}")]
    SchemaMismatch {
        /// Position of the first disagreement.
        index: usize,
        /// The schema's name at that position.
        expected: String,
        /// The artifact's name at that position.
        found: String,
    },

    /// Structurally invalid forest (bad node indices, empty trees, ...).
    #[error("malformed model artifact: {message}")]
    Malformed {
        /// What was wrong.
        message: String,
    },
}

/// A node in a regression tree.
///
/// Split children are indices into the tree's node list and must point
/// strictly forward, so traversal always terminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Terminal node carrying the predicted depth contribution.
    Leaf {
        /// Predicted value at this leaf.
        value: f64,
    },
    /// Binary split: `x[feature] <= threshold` goes left.
    Split {
        /// Feature position in the shared schema.
        feature: usize,
        /// Split threshold.
        threshold: f64,
        /// Node index taken when the feature is `<= threshold`.
        left: usize,
        /// Node index taken otherwise.
        right: usize,
    },
}

/// One regression tree, rooted at node 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Nodes in forward order.
    pub nodes: Vec<TreeNode>,
}

/// The persisted forest artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestArtifact {
    /// Feature names the forest was trained against, in order.
    pub feature_names: Vec<String>,
    /// The ensemble.
    pub trees: Vec<Tree>,
}

/// A loaded, validated regression forest.
#[derive(Debug)]
pub struct RegressionForest {
    trees: Vec<Tree>,
}

impl RegressionForest {
    /// Loads and validates the artifact at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the artifact is unreadable, malformed,
    /// or trained against a different feature schema.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let artifact: ForestArtifact = serde_json::from_str(&raw)?;
        let forest = Self::from_artifact(artifact)?;
        log::info!(
            "Loaded regression forest from {} ({} trees)",
            path.display(),
            forest.trees.len()
        );
        Ok(forest)
    }

    /// Validates an already-deserialized artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::SchemaMismatch`] on the first feature-name
    /// disagreement and [`ModelError::Malformed`] on structural problems.
    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self, ModelError> {
        if artifact.feature_names.len() != FEATURE_COUNT {
            return Err(ModelError::Malformed {
                message: format!(
                    "expected {FEATURE_COUNT} feature names, found {}",
                    artifact.feature_names.len()
                ),
            });
        }
        for (index, (found, expected)) in artifact
            .feature_names
            .iter()
            .zip(FEATURE_NAMES.iter())
            .enumerate()
        {
            if found != expected {
                return Err(ModelError::SchemaMismatch {
                    index,
                    expected: (*expected).to_string(),
                    found: found.clone(),
                });
            }
        }

        if artifact.trees.is_empty() {
            return Err(ModelError::Malformed {
                message: "forest has no trees".to_string(),
            });
        }
        for (tree_index, tree) in artifact.trees.iter().enumerate() {
            validate_tree(tree_index, tree)?;
        }

        Ok(Self {
            trees: artifact.trees,
        })
    }

    /// Number of trees in the ensemble.
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Predicts depth-to-water (meters) for an assembled feature vector.
    ///
    /// Deterministic and pure: the mean of the per-tree leaf values.
    #[must_use]
    pub fn predict(&self, vector: &FeatureVector) -> f64 {
        let values = vector.values();
        let sum: f64 = self.trees.iter().map(|tree| evaluate(tree, values)).sum();
        #[allow(clippy::cast_precision_loss)]
        let count = self.trees.len() as f64;
        sum / count
    }
}

fn evaluate(tree: &Tree, values: &[f64; FEATURE_COUNT]) -> f64 {
    let mut index = 0;
    loop {
        match &tree.nodes[index] {
            TreeNode::Leaf { value } => return *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                index = if values[*feature] <= *threshold {
                    *left
                } else {
                    *right
                };
            }
        }
    }
}

fn validate_tree(tree_index: usize, tree: &Tree) -> Result<(), ModelError> {
    if tree.nodes.is_empty() {
        return Err(ModelError::Malformed {
            message: format!("tree {tree_index} has no nodes"),
        });
    }
    for (node_index, node) in tree.nodes.iter().enumerate() {
        if let TreeNode::Split {
            feature,
            left,
            right,
            ..
        } = node
        {
            if *feature >= FEATURE_COUNT {
                return Err(ModelError::Malformed {
                    message: format!(
                        "tree {tree_index} node {node_index} splits on feature {feature}, \
                         schema has {FEATURE_COUNT}"
                    ),
                });
            }
            for child in [left, right] {
                if *child >= tree.nodes.len() || *child <= node_index {
                    return Err(ModelError::Malformed {
                        message: format!(
                            "tree {tree_index} node {node_index} has invalid child {child}"
                        ),
                    });
                }
            }
        }
    }
    Ok(())
}

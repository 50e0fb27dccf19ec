//! Persisted classifier model.
//!
//! The classifier is an ensemble of decision trees serialized as JSON by
//! the offline training step. This crate treats it as an opaque
//! probability predictor: it only knows the trained feature schema and
//! how to evaluate `predict_proba` over an aligned feature vector.

use crate::core::features::FeatureVector;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One node of a decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Internal split: go left if `value <= threshold`, else right.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Leaf with a class probability distribution.
    Leaf { probs: [f64; 2] },
}

/// One decision tree; node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

/// A trained ensemble classifier, immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    /// Feature columns the model was trained on, in training order
    feature_names: Vec<String>,
    trees: Vec<Tree>,
}

/// Errors raised while loading or evaluating a model.
#[derive(Debug)]
pub enum ModelError {
    IoError(String),
    ParseError(String),
    /// The model contains no trees.
    EmptyForest,
    /// A tree references nodes or features that do not exist, or cycles.
    InvalidTree(String),
    /// The input vector's columns do not match the trained schema.
    SchemaMismatch(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::IoError(e) => write!(f, "IO error: {e}"),
            ModelError::ParseError(e) => write!(f, "Parse error: {e}"),
            ModelError::EmptyForest => write!(f, "model contains no trees"),
            ModelError::InvalidTree(e) => write!(f, "invalid tree: {e}"),
            ModelError::SchemaMismatch(e) => write!(f, "schema mismatch: {e}"),
        }
    }
}

impl std::error::Error for ModelError {}

impl ForestModel {
    /// Build a model from parts, validating its structure.
    pub fn new(feature_names: Vec<String>, trees: Vec<Tree>) -> Result<Self, ModelError> {
        let model = Self {
            feature_names,
            trees,
        };
        model.validate()?;
        Ok(model)
    }

    /// Load a model from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ModelError::IoError(e.to_string()))?;
        let model: ForestModel =
            serde_json::from_str(&content).map_err(|e| ModelError::ParseError(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// Save the model as pretty JSON (used by the offline training step).
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ModelError::IoError(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ModelError::ParseError(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ModelError::IoError(e.to_string()))
    }

    /// Feature columns the model expects, in order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Predict class probabilities for an aligned feature vector.
    ///
    /// The vector's columns must exactly equal the trained schema, in
    /// order. Returns `[p_relaxed, p_concentrating]` summing to 1.0.
    pub fn predict_proba(&self, vector: &FeatureVector) -> Result<[f64; 2], ModelError> {
        if vector.names() != self.feature_names.iter().map(|s| s.as_str()).collect::<Vec<_>>() {
            return Err(ModelError::SchemaMismatch(format!(
                "input columns {:?} do not match trained columns {:?}",
                vector.names(),
                self.feature_names
            )));
        }

        let values = vector.values();
        let mut sums = [0.0, 0.0];
        for tree in &self.trees {
            let probs = evaluate_tree(tree, &values)?;
            sums[0] += probs[0];
            sums[1] += probs[1];
        }

        let total = sums[0] + sums[1];
        if total <= 0.0 {
            return Err(ModelError::InvalidTree(
                "leaf distributions sum to zero".to_string(),
            ));
        }
        Ok([sums[0] / total, sums[1] / total])
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::EmptyForest);
        }
        for (tree_index, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ModelError::InvalidTree(format!(
                    "tree {tree_index} has no nodes"
                )));
            }
            for (node_index, node) in tree.nodes.iter().enumerate() {
                if let Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } = node
                {
                    if *feature >= self.feature_names.len() {
                        return Err(ModelError::InvalidTree(format!(
                            "tree {tree_index} node {node_index} references feature {feature}, \
                             model has {}",
                            self.feature_names.len()
                        )));
                    }
                    if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                        return Err(ModelError::InvalidTree(format!(
                            "tree {tree_index} node {node_index} references a missing child"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Walk one tree to a leaf. The step budget guards against cyclic trees,
/// which index validation alone does not rule out.
fn evaluate_tree(tree: &Tree, values: &[f64]) -> Result<[f64; 2], ModelError> {
    let mut index = 0;
    for _ in 0..tree.nodes.len() {
        match &tree.nodes[index] {
            Node::Leaf { probs } => return Ok(*probs),
            Node::Split {
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
    Err(ModelError::InvalidTree(
        "tree walk did not reach a leaf".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A one-split forest: c1_mean <= 0.0 leans relaxed, else concentrating.
    fn stub_model() -> ForestModel {
        ForestModel::new(
            vec!["c1_mean".to_string(), "c2_var".to_string()],
            vec![Tree {
                nodes: vec![
                    Node::Split {
                        feature: 0,
                        threshold: 0.0,
                        left: 1,
                        right: 2,
                    },
                    Node::Leaf { probs: [0.9, 0.1] },
                    Node::Leaf { probs: [0.2, 0.8] },
                ],
            }],
        )
        .unwrap()
    }

    fn vector(pairs: &[(&str, f64)]) -> FeatureVector {
        let mut v = FeatureVector::new();
        for (name, value) in pairs {
            v.push(*name, *value);
        }
        v
    }

    #[test]
    fn test_predict_both_branches() {
        let model = stub_model();

        let relaxed = model
            .predict_proba(&vector(&[("c1_mean", -1.0), ("c2_var", 0.0)]))
            .unwrap();
        assert_eq!(relaxed, [0.9, 0.1]);

        let concentrating = model
            .predict_proba(&vector(&[("c1_mean", 1.0), ("c2_var", 0.0)]))
            .unwrap();
        assert_eq!(concentrating, [0.2, 0.8]);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = stub_model();
        let probs = model
            .predict_proba(&vector(&[("c1_mean", 0.5), ("c2_var", 2.0)]))
            .unwrap();
        assert!((probs[0] + probs[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ensemble_averages_trees() {
        let tree_a = Tree {
            nodes: vec![Node::Leaf { probs: [1.0, 0.0] }],
        };
        let tree_b = Tree {
            nodes: vec![Node::Leaf { probs: [0.0, 1.0] }],
        };
        let model = ForestModel::new(vec!["f".to_string()], vec![tree_a, tree_b]).unwrap();

        let probs = model.predict_proba(&vector(&[("f", 0.0)])).unwrap();
        assert_eq!(probs, [0.5, 0.5]);
    }

    #[test]
    fn test_predict_rejects_wrong_column_order() {
        let model = stub_model();
        let err = model
            .predict_proba(&vector(&[("c2_var", 0.0), ("c1_mean", -1.0)]))
            .unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch(_)));
    }

    #[test]
    fn test_empty_forest_rejected() {
        let err = ForestModel::new(vec!["f".to_string()], vec![]).unwrap_err();
        assert!(matches!(err, ModelError::EmptyForest));
    }

    #[test]
    fn test_out_of_range_child_rejected() {
        let err = ForestModel::new(
            vec!["f".to_string()],
            vec![Tree {
                nodes: vec![Node::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 5,
                    right: 6,
                }],
            }],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidTree(_)));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let model = stub_model();
        model.save(&path).unwrap();

        let loaded = ForestModel::load(&path).unwrap();
        assert_eq!(loaded.feature_names(), model.feature_names());

        let input = vector(&[("c1_mean", -1.0), ("c2_var", 0.0)]);
        assert_eq!(
            loaded.predict_proba(&input).unwrap(),
            model.predict_proba(&input).unwrap()
        );
    }

    #[test]
    fn test_load_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = ForestModel::load(&path).unwrap_err();
        assert!(matches!(err, ModelError::ParseError(_)));
    }
}

//! Random-forest classifier loaded from a JSON artifact.
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "n_features": 42,
//!   "classes": [0, 1, 2, 3, 4],
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 0, "threshold": 0.12, "left": 1, "right": 2 },
//!         { "value": [3.0, 0.0, 0.0, 0.0, 1.0] },
//!         { "value": [0.0, 5.0, 0.0, 0.0, 0.0] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! A split sends a sample left when `x[feature] <= threshold`, compared in
//! `f64` since exported thresholds are `f64` midpoints. Leaves hold
//! per-class weights (sample counts or probabilities). The prediction is the
//! class with the highest mean of the normalized leaf distributions; ties go
//! to the class listed first.

use std::path::Path;

use serde::Deserialize;

use crate::classifier::Classifier;
use crate::error::{MlError, MlResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f32>,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    n_features: usize,
    classes: Vec<i64>,
    trees: Vec<Tree>,
}

/// Validated forest. Only constructed through [`RandomForest::from_json`] or
/// [`RandomForest::from_file`].
#[derive(Debug, Clone)]
pub struct RandomForest {
    n_features: usize,
    classes: Vec<i64>,
    trees: Vec<Tree>,
}

impl RandomForest {
    /// Parse and validate a model from JSON text.
    pub fn from_json(json: &str) -> MlResult<Self> {
        let artifact: Artifact =
            serde_json::from_str(json).map_err(|e| MlError::InvalidModel(e.to_string()))?;
        let model = RandomForest {
            n_features: artifact.n_features,
            classes: artifact.classes,
            trees: artifact.trees,
        };
        model.validate()?;
        Ok(model)
    }

    /// Read, parse and validate a model artifact.
    pub fn from_file(path: &Path) -> MlResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| MlError::ModelLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json).map_err(|e| MlError::ModelLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn feature_count(&self) -> usize {
        self.n_features
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Children must come after their parent, so every walk terminates.
    fn validate(&self) -> MlResult<()> {
        if self.classes.is_empty() {
            return Err(MlError::InvalidModel("no classes".to_string()));
        }
        if self.trees.is_empty() {
            return Err(MlError::InvalidModel("no trees".to_string()));
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(MlError::InvalidModel(format!("tree {} is empty", t)));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= self.n_features {
                            return Err(MlError::InvalidModel(format!(
                                "tree {} node {} splits on feature {} of {}",
                                t, i, feature, self.n_features
                            )));
                        }
                        if !threshold.is_finite() {
                            return Err(MlError::InvalidModel(format!(
                                "tree {} node {} has a non-finite threshold",
                                t, i
                            )));
                        }
                        for child in [*left, *right] {
                            if child <= i || child >= tree.nodes.len() {
                                return Err(MlError::InvalidModel(format!(
                                    "tree {} node {} has invalid child {}",
                                    t, i, child
                                )));
                            }
                        }
                    }
                    Node::Leaf { value } => {
                        if value.len() != self.classes.len() {
                            return Err(MlError::InvalidModel(format!(
                                "tree {} leaf {} has {} values for {} classes",
                                t,
                                i,
                                value.len(),
                                self.classes.len()
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf<'a>(tree: &'a Tree, features: &[f32]) -> &'a [f32] {
        let mut index = 0;
        loop {
            match &tree.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if f64::from(features[*feature]) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Leaf { value } => return value,
            }
        }
    }

    /// Mean normalized class distribution over all trees.
    pub fn predict_proba(&self, features: &[f32]) -> MlResult<Vec<f32>> {
        if features.len() != self.n_features {
            return Err(MlError::FeatureMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        if features.iter().any(|v| !v.is_finite()) {
            return Err(MlError::NonFiniteFeatures);
        }

        let mut totals = vec![0.0f32; self.classes.len()];
        for tree in &self.trees {
            let value = Self::leaf(tree, features);
            let sum: f32 = value.iter().sum();
            if sum > 0.0 {
                for (total, v) in totals.iter_mut().zip(value) {
                    *total += v / sum;
                }
            }
        }
        let n = self.trees.len() as f32;
        totals.iter_mut().for_each(|t| *t /= n);
        Ok(totals)
    }
}

impl Classifier for RandomForest {
    fn predict(&self, features: &[f32]) -> MlResult<i64> {
        let proba = self.predict_proba(features)?;
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        Ok(self.classes[best])
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }
}

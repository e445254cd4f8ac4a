//! Pre-trained loan classifier.
//!
//! The classifier is trained elsewhere and exported as a JSON artifact. It is
//! loaded once at startup and shared read-only; the only operation is a
//! single `predict` over a three-element feature vector.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LoanError, Result};

/// Number of model inputs: income, loan amount, credit history.
pub const FEATURE_COUNT: usize = 3;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["ApplicantIncome", "LoanAmount", "Credit_History"];

/// Validated model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub income: f64,
    pub loan_amount: f64,
    pub credit_history: u8,
}

impl FeatureVector {
    pub fn new(income: f64, loan_amount: f64, credit_history: u8) -> Result<Self> {
        let features = Self {
            income,
            loan_amount,
            credit_history,
        };
        features.validate()?;
        Ok(features)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.income.is_finite() || self.income < 0.0 {
            return Err(LoanError::invalid_feature("income", "must be a number >= 0"));
        }
        if !self.loan_amount.is_finite() || self.loan_amount < 0.0 {
            return Err(LoanError::invalid_feature("loan_amount", "must be a number >= 0"));
        }
        if self.credit_history > 1 {
            return Err(LoanError::invalid_feature("credit_history", "must be 0 or 1"));
        }
        Ok(())
    }

    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [self.income, self.loan_amount, f64::from(self.credit_history)]
    }
}

/// A binary classifier over [`FeatureVector`].
pub trait Classifier: Send + Sync {
    /// Returns the predicted label, 0 or 1.
    fn predict(&self, features: &FeatureVector) -> Result<u8>;

    /// Short description for logs and the health endpoint.
    fn describe(&self) -> String;
}

/// Node of an exported decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, else `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(u8),
}

fn default_threshold() -> f64 {
    0.5
}

/// Serialized classifier, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression {
        coefficients: [f64; FEATURE_COUNT],
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    DecisionTree {
        nodes: Vec<TreeNode>,
    },
}

impl ModelArtifact {
    /// Structural checks; a tree that passes always terminates.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Self::LogisticRegression {
                coefficients,
                intercept,
                threshold,
            } => {
                if coefficients.iter().chain([intercept, threshold]).any(|v| !v.is_finite()) {
                    return Err("non-finite parameter".to_string());
                }
                if !(0.0..=1.0).contains(threshold) {
                    return Err(format!("threshold {} outside [0, 1]", threshold));
                }
                Ok(())
            }
            Self::DecisionTree { nodes } => {
                if nodes.is_empty() {
                    return Err("decision tree has no nodes".to_string());
                }
                for (i, node) in nodes.iter().enumerate() {
                    match *node {
                        TreeNode::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        } => {
                            if feature >= FEATURE_COUNT {
                                return Err(format!("node {}: feature index {} out of range", i, feature));
                            }
                            if !threshold.is_finite() {
                                return Err(format!("node {}: non-finite threshold", i));
                            }
                            for child in [left, right] {
                                if child <= i || child >= nodes.len() {
                                    return Err(format!("node {}: invalid child index {}", i, child));
                                }
                            }
                        }
                        TreeNode::Leaf(label) if label > 1 => {
                            return Err(format!("node {}: label {} is not binary", i, label));
                        }
                        TreeNode::Leaf(_) => {}
                    }
                }
                Ok(())
            }
        }
    }
}

impl Classifier for ModelArtifact {
    fn predict(&self, features: &FeatureVector) -> Result<u8> {
        let x = features.as_array();
        match self {
            Self::LogisticRegression {
                coefficients,
                intercept,
                threshold,
            } => {
                let z: f64 = coefficients.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + intercept;
                let probability = 1.0 / (1.0 + (-z).exp());
                Ok(u8::from(probability >= *threshold))
            }
            Self::DecisionTree { nodes } => {
                let mut idx = 0;
                loop {
                    match nodes.get(idx) {
                        Some(TreeNode::Leaf(label)) => return Ok(*label),
                        Some(TreeNode::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        }) => {
                            // children always point forward, so this terminates
                            idx = if x[*feature] <= *threshold { *left } else { *right };
                        }
                        None => {
                            return Err(LoanError::inference(format!("tree node {} does not exist", idx)))
                        }
                    }
                }
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::LogisticRegression { threshold, .. } => {
                format!("logistic_regression(threshold={})", threshold)
            }
            Self::DecisionTree { nodes } => format!("decision_tree(nodes={})", nodes.len()),
        }
    }
}

/// Load and validate a model artifact from disk.
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelArtifact> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| LoanError::invalid_model(path, format!("cannot read file: {}", e)))?;
    let artifact: ModelArtifact = serde_json::from_str(&content)
        .map_err(|e| LoanError::invalid_model(path, e.to_string()))?;
    artifact
        .validate()
        .map_err(|reason| LoanError::invalid_model(path, reason))?;

    info!(path = %path.display(), model = %artifact.describe(), "loaded model");
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn credit_tree() -> ModelArtifact {
        // approve iff credit history is 1
        ModelArtifact::DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 2,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf(0),
                TreeNode::Leaf(1),
            ],
        }
    }

    #[test]
    fn feature_vector_validation() {
        assert!(FeatureVector::new(5000.0, 100.0, 1).is_ok());
        assert!(FeatureVector::new(0.0, 0.0, 0).is_ok());
        assert!(FeatureVector::new(-1.0, 100.0, 1).is_err());
        assert!(FeatureVector::new(5000.0, f64::NAN, 1).is_err());
        assert!(FeatureVector::new(5000.0, 100.0, 2).is_err());
    }

    #[test]
    fn feature_order_matches_training() {
        let f = FeatureVector::new(5000.0, 100.0, 1).unwrap();
        assert_eq!(f.as_array(), [5000.0, 100.0, 1.0]);
    }

    #[test]
    fn tree_follows_splits() {
        let model = credit_tree();
        let good = FeatureVector::new(5000.0, 100.0, 1).unwrap();
        let bad = FeatureVector::new(5000.0, 100.0, 0).unwrap();
        assert_eq!(model.predict(&good).unwrap(), 1);
        assert_eq!(model.predict(&bad).unwrap(), 0);
    }

    #[test]
    fn logistic_regression_thresholds_probability() {
        let model = ModelArtifact::LogisticRegression {
            coefficients: [0.0, 0.0, 4.0],
            intercept: -2.0,
            threshold: 0.5,
        };
        assert_eq!(model.predict(&FeatureVector::new(1.0, 1.0, 1).unwrap()).unwrap(), 1);
        assert_eq!(model.predict(&FeatureVector::new(1.0, 1.0, 0).unwrap()).unwrap(), 0);
    }

    #[test]
    fn rejects_backward_edges() {
        let looping = ModelArtifact::DecisionTree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 1.0,
                left: 0,
                right: 0,
            }],
        };
        assert!(looping.validate().unwrap_err().contains("invalid child"));
    }

    #[test]
    fn rejects_non_binary_leaf() {
        let model = ModelArtifact::DecisionTree {
            nodes: vec![TreeNode::Leaf(3)],
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn parses_json_artifact() {
        let json = r#"{
            "kind": "decision_tree",
            "nodes": [
                {"split": {"feature": 2, "threshold": 0.5, "left": 1, "right": 2}},
                {"leaf": 0},
                {"leaf": 1}
            ]
        }"#;
        let artifact: ModelArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(artifact, credit_tree());

        let json = r#"{"kind": "logistic_regression", "coefficients": [0.0001, -0.002, 3.1], "intercept": -1.5}"#;
        let artifact: ModelArtifact = serde_json::from_str(json).unwrap();
        assert!(matches!(
            artifact,
            ModelArtifact::LogisticRegression { threshold, .. } if threshold == 0.5
        ));
    }

    #[test]
    fn load_model_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&credit_tree()).unwrap()).unwrap();
        file.flush().unwrap();

        let model = load_model(file.path()).unwrap();
        assert_eq!(model.describe(), "decision_tree(nodes=3)");

        let shared: std::sync::Arc<dyn Classifier> = std::sync::Arc::new(model);
        let features = FeatureVector::new(1.0, 1.0, 1).unwrap();
        assert_eq!(shared.predict(&features).unwrap(), 1);
    }

    #[test]
    fn load_model_reports_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        file.flush().unwrap();

        let err = load_model(file.path()).unwrap_err();
        assert!(matches!(err, LoanError::InvalidModel { .. }));
    }
}

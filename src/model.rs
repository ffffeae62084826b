use log::info;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::align::AlignedVector;
use crate::error::{Result, RiskError};
use crate::schema::FeatureSchema;

/// Anything that scores an ordered feature vector into `[p_negative, p_positive]`
pub trait ProbabilisticModel: Send + Sync {
    fn class_probabilities(&self, features: &Array1<f64>) -> Result<[f64; 2]>;

    /// Number of input columns the model was fitted on
    fn feature_count(&self) -> usize;

    /// Column names recorded at training time, if the artifact carries them
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    fn summary(&self) -> ModelSummary;

    /// Structural checks run once when the model is wrapped
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelSummary {
    pub kind: String,
    pub trees: Option<usize>,
    pub feature_count: usize,
}

/// A decision tree node. Leaves carry a class distribution, split nodes send
/// `x[feature] <= threshold` to `left`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Node {
    #[serde(default)]
    pub feature: usize,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub left: usize,
    #[serde(default)]
    pub right: usize,
    /// Class weights `[negative, positive]` for leaves, None for splits
    #[serde(default)]
    pub value: Option<[f64; 2]>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

/// Random forest classifier: class probability is the mean of per-tree leaf distributions
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForestModel {
    pub n_features: usize,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub trees: Vec<Tree>,
}

/// Logistic model: sigmoid of intercept plus weighted features
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LogisticModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

/// Model artifact as stored on disk
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    RandomForest(ForestModel),
    Logistic(LogisticModel),
}

fn leaf_distribution(value: [f64; 2]) -> [f64; 2] {
    let total = value[0] + value[1];
    [value[0] / total, value[1] / total]
}

impl Tree {
    fn eval(&self, features: &Array1<f64>) -> Result<[f64; 2]> {
        let mut idx = 0usize;

        // A root-to-leaf path visits each node at most once
        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(idx).ok_or_else(|| {
                RiskError::Model(format!("tree node {} out of range", idx))
            })?;

            if let Some(value) = node.value {
                return Ok(leaf_distribution(value));
            }

            let x = features.get(node.feature).copied().ok_or_else(|| {
                RiskError::SchemaMismatch(format!(
                    "split on feature {} but vector has {} values",
                    node.feature,
                    features.len()
                ))
            })?;

            idx = if x <= node.threshold { node.left } else { node.right };
        }

        Err(RiskError::Model(format!(
            "no leaf reached after {} steps, tree has a cycle",
            self.nodes.len()
        )))
    }

    fn validate(&self, tree_idx: usize, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(RiskError::Startup(format!("tree {} has no nodes", tree_idx)));
        }

        for (node_idx, node) in self.nodes.iter().enumerate() {
            match node.value {
                Some(value) => {
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) || value[0] + value[1] <= 0.0 {
                        return Err(RiskError::Startup(format!(
                            "leaf {} in tree {} has invalid class weights {:?}",
                            node_idx, tree_idx, value
                        )));
                    }
                }
                None => {
                    if node.feature >= n_features {
                        return Err(RiskError::Startup(format!(
                            "node {} in tree {} splits on feature {} (model has {})",
                            node_idx, tree_idx, node.feature, n_features
                        )));
                    }
                    if !node.threshold.is_finite() {
                        return Err(RiskError::Startup(format!(
                            "node {} in tree {} has non-finite threshold",
                            node_idx, tree_idx
                        )));
                    }
                    // Children always come after their parent, so traversal terminates
                    for child in [node.left, node.right] {
                        if child <= node_idx || child >= self.nodes.len() {
                            return Err(RiskError::Startup(format!(
                                "node {} in tree {} has invalid child {}",
                                node_idx, tree_idx, child
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

impl ModelArtifact {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            RiskError::Startup(format!("cannot read model {}: {}", path.display(), e))
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&contents).map_err(|e| {
            RiskError::Startup(format!("model {} is not a valid artifact: {}", path.display(), e))
        })?;

        artifact.validate()?;
        Ok(artifact)
    }

    /// Structural checks so that scoring cannot loop or index out of bounds
    pub fn validate(&self) -> Result<()> {
        match self {
            ModelArtifact::RandomForest(forest) => {
                if forest.trees.is_empty() {
                    return Err(RiskError::Startup("forest has no trees".to_string()));
                }
                if forest.n_features == 0 {
                    return Err(RiskError::Startup("forest has no features".to_string()));
                }
                for (tree_idx, tree) in forest.trees.iter().enumerate() {
                    tree.validate(tree_idx, forest.n_features)?;
                }
                check_names_len(forest.feature_names.as_deref(), forest.n_features)
            }
            ModelArtifact::Logistic(logistic) => {
                if logistic.coefficients.is_empty() {
                    return Err(RiskError::Startup("logistic model has no coefficients".to_string()));
                }
                if !logistic.intercept.is_finite() || logistic.coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(RiskError::Startup("logistic model has non-finite weights".to_string()));
                }
                check_names_len(logistic.feature_names.as_deref(), logistic.coefficients.len())
            }
        }
    }
}

fn check_names_len(names: Option<&[String]>, expected: usize) -> Result<()> {
    match names {
        Some(names) if names.len() != expected => Err(RiskError::Startup(format!(
            "model lists {} feature names but expects {} features",
            names.len(),
            expected
        ))),
        _ => Ok(()),
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl ProbabilisticModel for ModelArtifact {
    fn class_probabilities(&self, features: &Array1<f64>) -> Result<[f64; 2]> {
        match self {
            ModelArtifact::RandomForest(forest) => {
                let mut sum = [0.0f64; 2];
                for tree in &forest.trees {
                    let dist = tree.eval(features)?;
                    sum[0] += dist[0];
                    sum[1] += dist[1];
                }
                let n = forest.trees.len() as f64;
                Ok([sum[0] / n, sum[1] / n])
            }
            ModelArtifact::Logistic(logistic) => {
                if features.len() != logistic.coefficients.len() {
                    return Err(RiskError::SchemaMismatch(format!(
                        "logistic model expects {} features, got {}",
                        logistic.coefficients.len(),
                        features.len()
                    )));
                }
                let weights = ArrayView1::from(&logistic.coefficients[..]);
                let p = sigmoid(logistic.intercept + weights.dot(features));
                Ok([1.0 - p, p])
            }
        }
    }

    fn feature_count(&self) -> usize {
        match self {
            ModelArtifact::RandomForest(forest) => forest.n_features,
            ModelArtifact::Logistic(logistic) => logistic.coefficients.len(),
        }
    }

    fn feature_names(&self) -> Option<&[String]> {
        match self {
            ModelArtifact::RandomForest(forest) => forest.feature_names.as_deref(),
            ModelArtifact::Logistic(logistic) => logistic.feature_names.as_deref(),
        }
    }

    fn validate(&self) -> Result<()> {
        ModelArtifact::validate(self)
    }

    fn summary(&self) -> ModelSummary {
        match self {
            ModelArtifact::RandomForest(forest) => ModelSummary {
                kind: "random_forest".to_string(),
                trees: Some(forest.trees.len()),
                feature_count: forest.n_features,
            },
            ModelArtifact::Logistic(logistic) => ModelSummary {
                kind: "logistic".to_string(),
                trees: None,
                feature_count: logistic.coefficients.len(),
            },
        }
    }
}

/// Read-only wrapper pairing a loaded model with the schema it was trained on
pub struct RiskClassifier {
    schema: Arc<FeatureSchema>,
    model: Box<dyn ProbabilisticModel>,
}

impl RiskClassifier {
    pub fn new(schema: Arc<FeatureSchema>, model: Box<dyn ProbabilisticModel>) -> Result<Self> {
        model.validate()?;
        if model.feature_count() != schema.len() {
            return Err(RiskError::Startup(format!(
                "model expects {} features but schema has {}",
                model.feature_count(),
                schema.len()
            )));
        }
        if let Some(names) = model.feature_names() {
            if names != schema.names() {
                return Err(RiskError::Startup(
                    "model feature names differ from the feature schema".to_string(),
                ));
            }
        }

        let summary = model.summary();
        info!(
            "Loaded {} model ({} features{})",
            summary.kind,
            summary.feature_count,
            summary.trees.map(|t| format!(", {} trees", t)).unwrap_or_default()
        );

        Ok(Self { schema, model })
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn summary(&self) -> ModelSummary {
        self.model.summary()
    }

    /// Probability of the positive (depressed) class
    pub fn predict_probability(&self, vector: &AlignedVector) -> Result<f64> {
        if vector.len() != self.schema.len() {
            return Err(RiskError::SchemaMismatch(format!(
                "vector has {} features, schema has {}",
                vector.len(),
                self.schema.len()
            )));
        }
        if !Arc::ptr_eq(vector.schema(), &self.schema) && vector.names() != self.schema.names() {
            return Err(RiskError::SchemaMismatch(
                "vector feature order differs from the trained schema".to_string(),
            ));
        }

        let probabilities = self.model.class_probabilities(vector.values())?;
        let p = probabilities[1];
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(RiskError::InvalidProbability(p));
        }

        Ok(p)
    }
}

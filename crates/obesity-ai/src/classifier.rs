//! Classifier adapters.
//!
//! A [`Classifier`] maps one assembled, normalized feature vector to one class
//! index. [`classify`] is the checked entry point: it refuses vectors whose
//! length differs from what the model was trained on, without calling the model.
//!
//! [`LinearClassifier`] evaluates a multinomial linear model exported as JSON
//! (per-class coefficients and intercepts) and picks the highest-scoring class.
//! The ONNX Runtime adapter lives in the `onnx` module.

use obesity_core::FeatureVector;
use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, PipelineError};

/// A trained model that predicts a single class index per feature vector.
///
/// Implementations are read-only after load and may be shared across threads.
pub trait Classifier: Send + Sync {
    /// Short name of the model format, for logs and status output.
    fn kind(&self) -> &'static str;

    /// Number of features the model was trained on.
    fn feature_count(&self) -> usize;

    /// Predict the class index for `features`.
    ///
    /// Returns whatever class the model produces; callers must not assume it
    /// is a known category.
    fn predict(&self, features: &[f64]) -> Result<i64, PipelineError>;
}

/// Run `model` once on `vector`, checking its length first.
pub fn classify(model: &dyn Classifier, vector: &FeatureVector) -> Result<i64, PipelineError> {
    if vector.len() != model.feature_count() {
        return Err(PipelineError::ConfigurationMismatch {
            component: "model",
            expected: model.feature_count(),
            actual: vector.len(),
        });
    }
    model.predict(vector.as_slice())
}

/// Linear model parameters as exported by the training pipeline.
///
/// `coefficients[k]` and `intercepts[k]` score class `classes[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub classes: Vec<i64>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

/// Multinomial linear classifier: `argmax_k(W[k] · x + b[k])`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearClassifier {
    classes: Vec<i64>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    dim: usize,
}

impl LinearClassifier {
    pub fn from_artifact(artifact: LinearArtifact) -> Result<Self, ArtifactError> {
        let LinearArtifact {
            classes,
            coefficients,
            intercepts,
        } = artifact;

        if classes.is_empty() {
            return Err(invalid("no classes".into()));
        }
        if coefficients.len() != classes.len() || intercepts.len() != classes.len() {
            return Err(invalid(format!(
                "{} classes, {} coefficient rows, {} intercepts",
                classes.len(),
                coefficients.len(),
                intercepts.len()
            )));
        }

        let dim = coefficients[0].len();
        if dim == 0 {
            return Err(invalid("coefficient rows are empty".into()));
        }
        if let Some(k) = coefficients.iter().position(|row| row.len() != dim) {
            return Err(invalid(format!(
                "coefficient row {k} has {} values, expected {dim}",
                coefficients[k].len()
            )));
        }
        let finite = coefficients
            .iter()
            .flatten()
            .chain(&intercepts)
            .all(|v| v.is_finite());
        if !finite {
            return Err(invalid("non-finite parameter".into()));
        }

        Ok(Self {
            classes,
            coefficients,
            intercepts,
            dim,
        })
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Per-class decision scores, in [`classes`](Self::classes) order.
    pub fn decision_function(&self, features: &[f64]) -> Vec<f64> {
        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| dot(row, features) + b)
            .collect()
    }
}

impl Classifier for LinearClassifier {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn feature_count(&self) -> usize {
        self.dim
    }

    fn predict(&self, features: &[f64]) -> Result<i64, PipelineError> {
        if features.len() != self.dim {
            return Err(PipelineError::ConfigurationMismatch {
                component: "model",
                expected: self.dim,
                actual: features.len(),
            });
        }
        let scores = self.decision_function(features);
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(PipelineError::Inference(
                "non-finite decision score (NaN or infinite feature)".into(),
            ));
        }
        Ok(self.classes[best_match(&scores)])
    }
}

/// Index of the highest score; the first one wins ties.
fn best_match(scores: &[f64]) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;

    for (i, &score) in scores.iter().enumerate() {
        if score > best_score {
            best_score = score;
            best = i;
        }
    }

    best
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn invalid(reason: String) -> ArtifactError {
    ArtifactError::Invalid {
        kind: "linear model",
        reason,
    }
}

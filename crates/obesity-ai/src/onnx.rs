//! ONNX Runtime classifier for exported tabular models.
//!
//! Expects a single float input of shape `[batch, n_features]` and a first
//! output holding the predicted int64 label, the layout produced by the usual
//! scikit-learn → ONNX converters.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use crate::classifier::Classifier;
use crate::error::{ArtifactError, PipelineError};

/// Classifier backed by an ONNX Runtime session.
///
/// ONNX Runtime needs exclusive access to run a session, so it sits behind a
/// mutex; concurrent predictions are serialized on it.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    feature_count: usize,
}

impl OnnxClassifier {
    /// Load a model from an `.onnx` file.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }

        let session = Session::builder()?.commit_from_file(path)?;

        let input = session.inputs().first().ok_or_else(|| ArtifactError::Invalid {
            kind: "onnx model",
            reason: "model has no inputs".into(),
        })?;
        let feature_count = infer_feature_count(input.dtype()).ok_or_else(|| {
            ArtifactError::Invalid {
                kind: "onnx model",
                reason: "input must be a tensor with a fixed last dimension".into(),
            }
        })?;

        info!(features = feature_count, model = %path.display(), "loaded onnx classifier");
        Ok(Self {
            session: Mutex::new(session),
            feature_count,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn predict(&self, features: &[f64]) -> Result<i64, PipelineError> {
        let data: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let shape = [1i64, data.len() as i64];
        let input = Tensor::from_array((shape, data.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| PipelineError::Inference("onnx session lock poisoned".into()))?;
        let outputs = session.run(ort::inputs![input])?;

        // Output 0: predicted labels, one per batch row.
        let (_, labels) = outputs[0].try_extract_tensor::<i64>()?;
        labels
            .first()
            .copied()
            .ok_or_else(|| PipelineError::Inference("model returned no label".into()))
    }
}

/// Feature count from the model's input type: the last dimension.
fn infer_feature_count(input_type: &ort::value::ValueType) -> Option<usize> {
    match input_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}

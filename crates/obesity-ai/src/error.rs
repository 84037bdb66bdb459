use std::path::PathBuf;

use obesity_core::{CategoricalAttribute, EncodingError};
use thiserror::Error;

/// Failure to read or validate a model or scaler artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported model format: {0} (expected .json or .onnx)")]
    UnsupportedFormat(PathBuf),

    #[error("{0} requires the `onnx` feature")]
    OnnxDisabled(PathBuf),

    #[error("invalid {kind} artifact: {reason}")]
    Invalid { kind: &'static str, reason: String },

    #[cfg(feature = "onnx")]
    #[error("onnx runtime error: {0}")]
    Onnx(#[from] ort::Error),
}

/// Failure to build an [`InferenceContext`](crate::InferenceContext).
///
/// Any of these means the process must not serve predictions.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("encoding tables: {0}")]
    Encoding(#[from] EncodingError),

    #[error("{component} takes {actual} features, pipeline produces {expected}")]
    Mismatch {
        component: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("scaler was fitted on {found:?}, pipeline scales {expected:?}")]
    FeatureNames {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Per-request failure of [`InferenceContext::predict`](crate::InferenceContext::predict).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown {attribute} value {value:?}")]
    UnknownCategory {
        attribute: CategoricalAttribute,
        value: String,
    },

    #[error("{component} expects {expected} features, got {actual}")]
    ConfigurationMismatch {
        component: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("inference failed: {0}")]
    Inference(String),

    #[cfg(feature = "onnx")]
    #[error("onnx runtime error: {0}")]
    Onnx(#[from] ort::Error),
}

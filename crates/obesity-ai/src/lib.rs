//! Local inference: fitted scaler, classifier adapters and the inference context.

mod artifact;
mod classifier;
mod context;
mod error;
mod scaler;

#[cfg(feature = "onnx")]
mod onnx;

pub use artifact::{load_model, load_scaler};
pub use classifier::{Classifier, LinearArtifact, LinearClassifier, classify};
pub use context::{InferenceContext, PipelineConfig, PredictionResult, UnknownPolicy};
pub use error::{ArtifactError, PipelineError, StartupError};
pub use scaler::{FittedScaler, ScalerArtifact, ScalerKind, normalize};

#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

//! The inference entry point.
//!
//! [`InferenceContext`] owns the validated encoding tables, the fitted scaler
//! and the trained model. It is built once at startup, shared read-only (wrap
//! it in an `Arc` to serve from several threads), and dropped at shutdown.
//! Construction fails if anything about the artifacts is inconsistent with the
//! feature layout, so a process that has a context can always serve requests.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use obesity_core::{
    Decoded, EncodingRegistry, FEATURE_COUNT, InputRecord, NUMERIC_FEATURE_COUNT,
    NumericAttribute, ObesityCategory, UnknownCategory, assemble, decode,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::artifact::{load_model, load_scaler};
use crate::classifier::{Classifier, classify};
use crate::error::{PipelineError, StartupError};
use crate::scaler::{FittedScaler, normalize};

/// What to do with a categorical answer outside its domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPolicy {
    /// Encode as -1, predict anyway, and flag the result.
    #[default]
    Warn,
    /// Fail the request with [`PipelineError::UnknownCategory`].
    Reject,
}

impl UnknownPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnknownPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warn" => Ok(Self::Warn),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown policy '{other}' (expected warn or reject)")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub on_unknown: UnknownPolicy,
}

/// Outcome of one inference call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Raw class index produced by the model.
    pub class_index: i64,
    /// Decoded category, or the unknown-result sentinel.
    pub label: Decoded,
    /// Categorical answers that were encoded as -1.
    pub unknown_inputs: Vec<UnknownCategory>,
}

impl PredictionResult {
    pub fn category(&self) -> Option<ObesityCategory> {
        self.label.category()
    }

    /// False when the input had unknown categories or the class was not recognized.
    pub fn is_reliable(&self) -> bool {
        self.unknown_inputs.is_empty() && self.label.is_recognized()
    }
}

/// Read-only state needed to serve predictions.
pub struct InferenceContext {
    registry: EncodingRegistry,
    scaler: FittedScaler,
    model: Box<dyn Classifier>,
    config: PipelineConfig,
}

impl fmt::Debug for InferenceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceContext")
            .field("scaler", &self.scaler.kind())
            .field("model", &self.model.kind())
            .field("config", &self.config)
            .finish()
    }
}

impl InferenceContext {
    /// Build a context from loaded artifacts, validating them against the
    /// feature layout.
    pub fn new(
        scaler: FittedScaler,
        model: Box<dyn Classifier>,
        config: PipelineConfig,
    ) -> Result<Self, StartupError> {
        let registry = EncodingRegistry::new()?;

        if scaler.feature_count() != NUMERIC_FEATURE_COUNT {
            return Err(StartupError::Mismatch {
                component: "scaler",
                expected: NUMERIC_FEATURE_COUNT,
                actual: scaler.feature_count(),
            });
        }
        if let Some(found) = scaler.feature_names() {
            let expected: Vec<String> = NumericAttribute::ALL
                .iter()
                .map(|a| a.column_name().to_string())
                .collect();
            if found != expected.as_slice() {
                return Err(StartupError::FeatureNames {
                    expected,
                    found: found.to_vec(),
                });
            }
        }
        if model.feature_count() != FEATURE_COUNT {
            return Err(StartupError::Mismatch {
                component: "model",
                expected: FEATURE_COUNT,
                actual: model.feature_count(),
            });
        }

        debug!(
            scaler = %scaler.kind(),
            model = model.kind(),
            on_unknown = %config.on_unknown,
            "inference context ready"
        );
        Ok(Self {
            registry,
            scaler,
            model,
            config,
        })
    }

    /// Load both artifacts from disk and build the context.
    pub fn load(
        model_path: &Path,
        scaler_path: &Path,
        config: PipelineConfig,
    ) -> Result<Self, StartupError> {
        let scaler = load_scaler(scaler_path)?;
        let model = load_model(model_path)?;
        Self::new(scaler, model, config)
    }

    pub fn scaler(&self) -> &FittedScaler {
        &self.scaler
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &EncodingRegistry {
        &self.registry
    }

    /// Encode, assemble, normalize, classify and decode one record.
    pub fn predict(&self, record: &InputRecord) -> Result<PredictionResult, PipelineError> {
        let assembled = assemble(&self.registry, record);

        if self.config.on_unknown == UnknownPolicy::Reject
            && let Some(first) = assembled.unknown.first()
        {
            return Err(PipelineError::UnknownCategory {
                attribute: first.attribute,
                value: first.value.clone(),
            });
        }

        let mut vector = assembled.vector;
        normalize(&self.scaler, &mut vector)
            .inspect_err(|e| warn!(error = %e, "normalization failed"))?;

        let class_index = classify(self.model.as_ref(), &vector)
            .inspect_err(|e| warn!(error = %e, "classification failed"))?;

        let label = decode(class_index);
        if !label.is_recognized() {
            warn!(class_index, "model returned an unrecognized class");
        }
        debug!(
            class_index,
            label = label.label(),
            unknown = assembled.unknown.len(),
            "prediction"
        );

        Ok(PredictionResult {
            class_index,
            label,
            unknown_inputs: assembled.unknown,
        })
    }

    /// Predict every record independently; one failure does not stop the rest.
    pub fn predict_batch(
        &self,
        records: &[InputRecord],
    ) -> Vec<Result<PredictionResult, PipelineError>> {
        records.iter().map(|r| self.predict(r)).collect()
    }
}

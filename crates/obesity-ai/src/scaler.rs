//! Fitted linear normalization of the numeric features.
//!
//! Both supported scaler kinds reduce to `(x - center) / scale` per feature:
//!
//! - `standard`: center = mean, scale = standard deviation
//! - `min_max`:  center = data min, scale = data max − data min
//!
//! A zero scale (constant feature at fit time) is replaced by 1.0, which is
//! what the fitting library does.

use std::fmt;

use obesity_core::FeatureVector;
use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, PipelineError};

/// On-disk scaler parameters, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    Standard {
        mean: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_names: Option<Vec<String>>,
    },
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_names: Option<Vec<String>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalerKind {
    Standard,
    MinMax,
}

impl ScalerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::MinMax => "min_max",
        }
    }
}

impl fmt::Display for ScalerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only scaler parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedScaler {
    kind: ScalerKind,
    center: Vec<f64>,
    scale: Vec<f64>,
    feature_names: Option<Vec<String>>,
}

impl FittedScaler {
    pub fn standard(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        Self::build(ScalerKind::Standard, mean, scale)
    }

    pub fn min_max(data_min: Vec<f64>, data_max: Vec<f64>) -> Result<Self, ArtifactError> {
        if data_min.len() != data_max.len() {
            return Err(invalid(format!(
                "data_min has {} values, data_max has {}",
                data_min.len(),
                data_max.len()
            )));
        }
        let range = data_min
            .iter()
            .zip(&data_max)
            .map(|(lo, hi)| hi - lo)
            .collect();
        Self::build(ScalerKind::MinMax, data_min, range)
    }

    pub fn from_artifact(artifact: ScalerArtifact) -> Result<Self, ArtifactError> {
        let (scaler, names) = match artifact {
            ScalerArtifact::Standard {
                mean,
                scale,
                feature_names,
            } => (Self::standard(mean, scale)?, feature_names),
            ScalerArtifact::MinMax {
                data_min,
                data_max,
                feature_names,
            } => (Self::min_max(data_min, data_max)?, feature_names),
        };
        match names {
            Some(names) => scaler.with_feature_names(names),
            None => Ok(scaler),
        }
    }

    /// Attach the column names the scaler was fitted on.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self, ArtifactError> {
        if names.len() != self.center.len() {
            return Err(invalid(format!(
                "{} feature names for {} features",
                names.len(),
                self.center.len()
            )));
        }
        self.feature_names = Some(names);
        Ok(self)
    }

    fn build(kind: ScalerKind, center: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        if center.is_empty() {
            return Err(invalid("no features".into()));
        }
        if center.len() != scale.len() {
            return Err(invalid(format!(
                "center has {} values, scale has {}",
                center.len(),
                scale.len()
            )));
        }
        if let Some(i) = center
            .iter()
            .chain(&scale)
            .position(|v| !v.is_finite())
        {
            return Err(invalid(format!("non-finite parameter at position {i}")));
        }

        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();

        Ok(Self {
            kind,
            center,
            scale,
            feature_names: None,
        })
    }

    pub fn kind(&self) -> ScalerKind {
        self.kind
    }

    pub fn feature_count(&self) -> usize {
        self.center.len()
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    pub fn center(&self) -> &[f64] {
        &self.center
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Apply `(x - center) / scale` to each value.
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>, PipelineError> {
        if values.len() != self.center.len() {
            return Err(PipelineError::ConfigurationMismatch {
                component: "scaler",
                expected: self.center.len(),
                actual: values.len(),
            });
        }
        Ok(values
            .iter()
            .zip(&self.center)
            .zip(&self.scale)
            .map(|((x, c), s)| (x - c) / s)
            .collect())
    }
}

fn invalid(reason: String) -> ArtifactError {
    ArtifactError::Invalid {
        kind: "scaler",
        reason,
    }
}

/// Normalize the numeric slots of `vector` in place; categorical codes are left as-is.
pub fn normalize(scaler: &FittedScaler, vector: &mut FeatureVector) -> Result<(), PipelineError> {
    let scaled = scaler.transform(&vector.numeric())?;
    vector
        .set_numeric(&scaled)
        .map_err(|e| PipelineError::ConfigurationMismatch {
            component: "feature vector",
            expected: e.expected,
            actual: e.actual,
        })
}

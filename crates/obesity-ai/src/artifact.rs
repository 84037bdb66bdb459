//! Loading model and scaler artifacts from disk.
//!
//! - Scaler: JSON [`ScalerArtifact`].
//! - Model: `.json` → [`LinearClassifier`] (tagged `"kind": "linear"`),
//!   `.onnx` → ONNX Runtime session (requires the `onnx` feature).

use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::classifier::{Classifier, LinearArtifact, LinearClassifier};
use crate::error::ArtifactError;
use crate::scaler::{FittedScaler, ScalerArtifact};

/// JSON model formats, tagged by `kind`.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ModelArtifact {
    Linear(LinearArtifact),
}

/// Load a fitted scaler from a JSON file.
pub fn load_scaler(path: &Path) -> Result<FittedScaler, ArtifactError> {
    let artifact: ScalerArtifact = read_json(path)?;
    let scaler = FittedScaler::from_artifact(artifact)?;
    info!(
        kind = %scaler.kind(),
        features = scaler.feature_count(),
        scaler = %path.display(),
        "loaded scaler"
    );
    Ok(scaler)
}

/// Load a trained classifier, choosing the format by file extension.
pub fn load_model(path: &Path) -> Result<Box<dyn Classifier>, ArtifactError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("json") => {
            let model = match read_json::<ModelArtifact>(path)? {
                ModelArtifact::Linear(artifact) => LinearClassifier::from_artifact(artifact)?,
            };
            info!(
                classes = model.classes().len(),
                features = model.feature_count(),
                model = %path.display(),
                "loaded linear classifier"
            );
            Ok(Box::new(model))
        }
        Some("onnx") => load_onnx(path),
        _ => Err(ArtifactError::UnsupportedFormat(path.to_path_buf())),
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path) -> Result<Box<dyn Classifier>, ArtifactError> {
    Ok(Box::new(crate::onnx::OnnxClassifier::load(path)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path) -> Result<Box<dyn Classifier>, ArtifactError> {
    Err(ArtifactError::OnnxDisabled(path.to_path_buf()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn write_file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut f = Builder::new().suffix(suffix).tempfile().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_standard_scaler() {
        let f = write_file(
            ".json",
            r#"{"kind": "standard", "mean": [1.0, 2.0], "scale": [0.5, 0.5]}"#,
        );
        let s = load_scaler(f.path()).unwrap();
        assert_eq!(s.feature_count(), 2);
        assert_eq!(s.transform(&[1.5, 1.5]).unwrap(), vec![1.0, -1.0]);
    }

    #[test]
    fn loads_linear_model() {
        let f = write_file(
            ".json",
            r#"{"kind": "linear", "classes": [0, 1],
                "coefficients": [[1.0], [-1.0]], "intercepts": [0.0, 0.0]}"#,
        );
        let m = load_model(f.path()).unwrap();
        assert_eq!(m.kind(), "linear");
        assert_eq!(m.feature_count(), 1);
        assert_eq!(m.predict(&[-3.0]).unwrap(), 1);
    }

    #[test]
    fn extension_is_case_insensitive() {
        let f = write_file(
            ".JSON",
            r#"{"kind": "linear", "classes": [0],
                "coefficients": [[1.0]], "intercepts": [0.0]}"#,
        );
        assert!(load_model(f.path()).is_ok());
    }

    #[test]
    fn missing_files_are_not_found() {
        let err = load_scaler(Path::new("/nonexistent/scaler.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(_)));
        let err = load_model(Path::new("/nonexistent/model.json")).err();
        assert!(matches!(err, Some(ArtifactError::NotFound(_))));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let f = write_file(".json", "not: [valid json");
        assert!(matches!(
            load_scaler(f.path()).unwrap_err(),
            ArtifactError::Json { .. }
        ));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let f = write_file(
            ".json",
            r#"{"kind": "standard", "mean": [1.0, 2.0], "scale": [1.0]}"#,
        );
        assert!(matches!(
            load_scaler(f.path()).unwrap_err(),
            ArtifactError::Invalid { kind: "scaler", .. }
        ));
    }

    #[test]
    fn unknown_model_kind_is_a_parse_error() {
        let f = write_file(".json", r#"{"kind": "forest", "trees": []}"#);
        assert!(matches!(
            load_model(f.path()).err(),
            Some(ArtifactError::Json { .. })
        ));
    }

    #[test]
    fn unsupported_extension() {
        let f = write_file(".pkl", "binary");
        assert!(matches!(
            load_model(f.path()).err(),
            Some(ArtifactError::UnsupportedFormat(_))
        ));
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn onnx_requires_feature() {
        let f = write_file(".onnx", "");
        assert!(matches!(
            load_model(f.path()).err(),
            Some(ArtifactError::OnnxDisabled(_))
        ));
    }
}

//! ONNX Classifier - Runtime Integration
//!
//! Loads a trained classifier from an ONNX file plus its verified label
//! sidecar, and runs single-row inference. Loading happens exactly once at
//! service startup (load-or-fail, not lazy); after that the only mutable
//! state is the ort session itself, which needs `&mut` to run and therefore
//! sits behind a lock. The `ModelHandle` is set at load and never touched
//! again.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{Value, ValueType};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use crate::constants::{
    DEFAULT_EMAIL_FEATURES, DEFAULT_URL_FEATURES, EMAIL_MODEL_FILE, URL_MODEL_FILE,
};
use crate::logic::features::layout::{is_layout_compatible, LayoutInfo};
use crate::logic::types::ContentType;

use super::labels::{LabelMapping, LabelMappingError};
use super::{Classifier, ModelHandle, RawPrediction};

// ============================================================================
// ERRORS
// ============================================================================

/// Fatal startup failure: missing/malformed model files or sidecars
#[derive(Debug)]
pub enum ModelLoadError {
    NotFound { path: String },
    Io { path: String, reason: String },
    Session { path: String, reason: String },
    Labels(LabelMappingError),
    UnverifiedLabels { path: String },
    ChecksumMismatch { path: String, expected: String, actual: String },
    LayoutMismatch { path: String, version: u8, hash: u32 },
}

impl std::fmt::Display for ModelLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelLoadError::NotFound { path } => write!(f, "model not found: {}", path),
            ModelLoadError::Io { path, reason } => write!(f, "cannot read {}: {}", path, reason),
            ModelLoadError::Session { path, reason } => {
                write!(f, "failed to load model {}: {}", path, reason)
            }
            ModelLoadError::Labels(e) => write!(f, "{}", e),
            ModelLoadError::UnverifiedLabels { path } => write!(
                f,
                "label mapping for {} has not been verified against known samples; refusing to serve",
                path
            ),
            ModelLoadError::ChecksumMismatch { path, expected, actual } => write!(
                f,
                "checksum mismatch for {}: sidecar pins {}, file is {}",
                path, expected, actual
            ),
            ModelLoadError::LayoutMismatch { path, version, hash } => write!(
                f,
                "model {} was trained against feature layout v{} (hash {:08x}), extractor differs",
                path, version, hash
            ),
        }
    }
}

impl std::error::Error for ModelLoadError {}

/// Unexpected failure while running inference on a single input
#[derive(Debug, Clone)]
pub struct PredictionError(pub String);

impl std::fmt::Display for PredictionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "prediction error: {}", self.0)
    }
}

impl std::error::Error for PredictionError {}

// ============================================================================
// ONNX CLASSIFIER
// ============================================================================

/// Production classifier backed by an ONNX Runtime session
#[derive(Debug)]
pub struct OnnxClassifier {
    kind: ContentType,
    session: RwLock<Session>,
    handle: ModelHandle,
    labels: LabelMapping,
}

impl OnnxClassifier {
    /// Load the classifier for `kind` from `models_dir`.
    ///
    /// Fails when the model file or its label sidecar is missing or
    /// malformed, when the sidecar is unverified, when a pinned checksum or
    /// feature layout does not match. Invoked exactly once per classifier at
    /// startup.
    pub fn load(kind: ContentType, models_dir: &Path) -> Result<Self, ModelLoadError> {
        let file_name = match kind {
            ContentType::Email => EMAIL_MODEL_FILE,
            ContentType::Url => URL_MODEL_FILE,
        };
        let model_path = models_dir.join(file_name);
        let display_path = model_path.display().to_string();

        log::info!("Loading {} classifier from {}", kind, display_path);

        if !model_path.exists() {
            return Err(ModelLoadError::NotFound { path: display_path });
        }

        let stem = file_name.trim_end_matches(".onnx");
        let sidecar_path = models_dir.join(format!("{}.labels.json", stem));
        let labels = LabelMapping::load(&sidecar_path).map_err(ModelLoadError::Labels)?;
        if !labels.verified {
            return Err(ModelLoadError::UnverifiedLabels {
                path: sidecar_path.display().to_string(),
            });
        }

        let bytes = std::fs::read(&model_path).map_err(|e| ModelLoadError::Io {
            path: display_path.clone(),
            reason: e.to_string(),
        })?;

        let actual_sha = sha256_hex(&bytes);
        if let Some(expected) = &labels.model_sha256 {
            if !expected.eq_ignore_ascii_case(&actual_sha) {
                return Err(ModelLoadError::ChecksumMismatch {
                    path: display_path,
                    expected: expected.clone(),
                    actual: actual_sha,
                });
            }
        }

        if let (Some(version), Some(hash)) = (labels.feature_version, labels.feature_layout_hash) {
            if !is_layout_compatible(version, hash) {
                return Err(ModelLoadError::LayoutMismatch {
                    path: display_path,
                    version,
                    hash,
                });
            }
        } else if kind == ContentType::Url {
            let layout = LayoutInfo::current();
            log::warn!(
                "{} has no feature layout pin; extractor is at v{} (hash {:08x}, {} heuristics)",
                sidecar_path.display(),
                layout.version,
                layout.hash,
                layout.heuristic_count
            );
        }

        let session = Session::builder()
            .map_err(|e| ModelLoadError::Session {
                path: display_path.clone(),
                reason: e.to_string(),
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelLoadError::Session {
                path: display_path.clone(),
                reason: e.to_string(),
            })?
            .commit_from_memory(&bytes)
            .map_err(|e| ModelLoadError::Session {
                path: display_path.clone(),
                reason: e.to_string(),
            })?;

        let expected_features = input_width(&session).unwrap_or(match kind {
            ContentType::Email => DEFAULT_EMAIL_FEATURES,
            ContentType::Url => DEFAULT_URL_FEATURES,
        });

        log::info!(
            "{} classifier loaded: {} input features, {} mapped labels",
            kind,
            expected_features,
            labels.len()
        );

        let handle = ModelHandle {
            loaded: true,
            expected_features,
            model_path: display_path,
            sha256: Some(actual_sha),
            loaded_at: chrono::Utc::now(),
        };

        Ok(Self {
            kind,
            session: RwLock::new(session),
            handle,
            labels,
        })
    }

    pub fn kind(&self) -> ContentType {
        self.kind
    }
}

impl Classifier for OnnxClassifier {
    fn handle(&self) -> &ModelHandle {
        &self.handle
    }

    fn labels(&self) -> &LabelMapping {
        &self.labels
    }

    fn predict(&self, features: &[f32]) -> Result<RawPrediction, PredictionError> {
        let expected = self.handle.expected_features;
        if features.len() != expected {
            return Err(PredictionError(format!(
                "expected {} features, got {}",
                expected,
                features.len()
            )));
        }

        let input_array = Array2::<f32>::from_shape_vec((1, expected), features.to_vec())
            .map_err(|e| PredictionError(format!("array error: {}", e)))?;

        let mut session = self.session.write();

        // sklearn-converted classifiers emit (label, probabilities); a plain
        // network emits a single tensor. Prefer the probabilities output.
        let output_name = session
            .outputs()
            .iter()
            .map(|o| o.name().to_string())
            .find(|n| n.as_str() == "probabilities")
            .or_else(|| session.outputs().last().map(|o| o.name().to_string()))
            .ok_or_else(|| PredictionError("model defines no outputs".to_string()))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| PredictionError(format!("tensor error: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| PredictionError(format!("inference failed: {}", e)))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| PredictionError(format!("output {:?} missing", output_name)))?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictionError(format!("extract error: {}", e)))?;

        RawPrediction::from_probabilities(output_tensor.1.to_vec())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Width of the model's first input, when the graph declares a static shape
fn input_width(session: &Session) -> Option<usize> {
    let input = session.inputs().first()?;
    if let ValueType::Tensor { shape, .. } = input.dtype() {
        shape
            .last()
            .copied()
            .filter(|&d| d > 0)
            .map(|d| d as usize)
    } else {
        None
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::types::ContentType;

    #[test]
    fn test_load_fails_on_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let err = OnnxClassifier::load(ContentType::Email, dir.path()).unwrap_err();
        assert!(matches!(err, ModelLoadError::NotFound { .. }));
    }

    #[test]
    fn test_load_fails_on_missing_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(EMAIL_MODEL_FILE), b"not a real model").unwrap();

        let err = OnnxClassifier::load(ContentType::Email, dir.path()).unwrap_err();
        assert!(matches!(err, ModelLoadError::Labels(_)));
    }

    #[test]
    fn test_load_fails_on_unverified_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(URL_MODEL_FILE), b"bytes").unwrap();
        std::fs::write(
            dir.path().join("url_classifier.labels.json"),
            r#"{"labels":{"0":"safe","1":"phishing"},"verified":false}"#,
        )
        .unwrap();

        let err = OnnxClassifier::load(ContentType::Url, dir.path()).unwrap_err();
        assert!(matches!(err, ModelLoadError::UnverifiedLabels { .. }));
    }

    #[test]
    fn test_load_fails_on_checksum_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(URL_MODEL_FILE), b"bytes").unwrap();
        std::fs::write(
            dir.path().join("url_classifier.labels.json"),
            r#"{"labels":{"0":"safe","1":"phishing"},"verified":true,"model_sha256":"00ff"}"#,
        )
        .unwrap();

        let err = OnnxClassifier::load(ContentType::Url, dir.path()).unwrap_err();
        assert!(matches!(err, ModelLoadError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_load_fails_on_layout_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(URL_MODEL_FILE), b"bytes").unwrap();
        // Stale layout pin: version 0 never matches the current layout
        std::fs::write(
            dir.path().join("url_classifier.labels.json"),
            r#"{"labels":{"0":"safe","1":"phishing"},"verified":true,"feature_version":0,"feature_layout_hash":1}"#,
        )
        .unwrap();

        let err = OnnxClassifier::load(ContentType::Url, dir.path()).unwrap_err();
        assert!(matches!(err, ModelLoadError::LayoutMismatch { .. }));
    }

    #[test]
    fn test_sha256_hex() {
        // Known digest of the empty input
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}

//! Model Module - Classifier Abstraction & ONNX Inference
//!
//! The `Classifier` trait is the polymorphic seam between the coordinator and
//! the model runtime; `OnnxClassifier` is the production implementation. Both
//! deployed models (email, url) consume a fixed-width f32 feature vector and
//! produce a class probability distribution.

pub mod inference;
pub mod labels;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use inference::{ModelLoadError, OnnxClassifier, PredictionError};
pub use labels::{LabelMapping, LabelMappingError};

// ============================================================================
// MODEL HANDLE
// ============================================================================

/// Immutable wrapper around a loaded model's identity.
///
/// Constructed exactly once at load time; read-only afterward. No request
/// path mutates a handle, so classifiers are safely shared across
/// concurrent requests.
#[derive(Debug, Clone, Serialize)]
pub struct ModelHandle {
    pub loaded: bool,
    /// Input dimensionality the model expects; feature vectors must match
    pub expected_features: usize,
    pub model_path: String,
    /// Hex SHA-256 of the model file, when the sidecar pinned one
    pub sha256: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// RAW PREDICTION
// ============================================================================

/// Unmapped classifier output: label index plus class probabilities.
///
/// `raw_label = argmax(probabilities)`, `confidence = max(probabilities)`.
/// Semantic interpretation happens later via `LabelMapping`.
#[derive(Debug, Clone, Serialize)]
pub struct RawPrediction {
    pub raw_label: i64,
    pub confidence: f32,
    pub probabilities: Vec<f32>,
}

impl RawPrediction {
    /// Build from a probability distribution. Fails on an empty slice.
    pub fn from_probabilities(probabilities: Vec<f32>) -> Result<Self, PredictionError> {
        if probabilities.is_empty() {
            return Err(PredictionError("model produced no probabilities".to_string()));
        }
        // NaN never wins the argmax fold below, so it must be rejected here
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(PredictionError(
                "model produced a non-finite probability".to_string(),
            ));
        }

        let (raw_label, confidence) = probabilities
            .iter()
            .enumerate()
            .fold((0usize, f32::MIN), |(bi, bv), (i, &v)| {
                if v > bv {
                    (i, v)
                } else {
                    (bi, bv)
                }
            });

        let sum: f32 = probabilities.iter().sum();
        if (sum - 1.0).abs() > 0.01 {
            log::warn!("class probabilities sum to {:.4}, expected ~1.0", sum);
        }

        Ok(Self {
            raw_label: raw_label as i64,
            confidence,
            probabilities,
        })
    }
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Polymorphic capability over the loaded classifiers (email, url).
///
/// Implementations are immutable after construction and safe to share.
pub trait Classifier: Send + Sync {
    /// Load-time identity of the wrapped model
    fn handle(&self) -> &ModelHandle;

    /// Verified raw-label → verdict convention for this model
    fn labels(&self) -> &LabelMapping;

    /// Run inference on one feature vector of `handle().expected_features`
    /// values
    fn predict(&self, features: &[f32]) -> Result<RawPrediction, PredictionError>;

    /// Batch form; index-aligned with `inputs` and equivalent to calling
    /// `predict` per item (no cross-item interaction).
    fn predict_many(&self, inputs: &[Vec<f32>]) -> Result<Vec<RawPrediction>, PredictionError> {
        inputs.iter().map(|features| self.predict(features)).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! Label Mapping Sidecar - Raw Label → Semantic Verdict
//!
//! The raw integer a classifier outputs means nothing by itself; whether `1`
//! is Phishing or Safe was decided by the training-time label encoding. That
//! convention is supplied next to each model as `<name>.labels.json` and must
//! have been verified against known-labeled samples before deployment. An
//! absent or unverified sidecar fails the load - the mapping is never
//! guessed or hard-coded.
//!
//! Sidecar format:
//! ```json
//! {
//!   "labels": { "0": "safe", "1": "phishing" },
//!   "verified": true,
//!   "verified_on": "2024-11-02",
//!   "model_sha256": "ab12..."
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::logic::types::Verdict;

// ============================================================================
// SIDECAR SHAPE
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct LabelSidecar {
    /// Raw label (as decimal string key) → "phishing" | "safe"
    labels: HashMap<String, String>,
    /// Set by the verification procedure, never by hand
    #[serde(default)]
    verified: bool,
    /// When the mapping was verified (informational)
    #[serde(default)]
    verified_on: Option<String>,
    /// Expected SHA-256 of the model file, hex encoded
    #[serde(default)]
    model_sha256: Option<String>,
    /// Feature layout version the model was trained against (URL model)
    #[serde(default)]
    feature_version: Option<u8>,
    /// CRC32 of the feature layout the model was trained against
    #[serde(default)]
    feature_layout_hash: Option<u32>,
}

// ============================================================================
// LABEL MAPPING
// ============================================================================

/// Verified raw-label → verdict mapping for one model
#[derive(Debug, Clone, Serialize)]
pub struct LabelMapping {
    mapping: Vec<(i64, Verdict)>,
    pub verified: bool,
    pub verified_on: Option<String>,
    pub model_sha256: Option<String>,
    pub feature_version: Option<u8>,
    pub feature_layout_hash: Option<u32>,
}

impl LabelMapping {
    /// Load and parse a sidecar file. Parsing succeeds for unverified
    /// sidecars; the model loader is responsible for rejecting those.
    pub fn load(path: &Path) -> Result<Self, LabelMappingError> {
        let raw = std::fs::read_to_string(path).map_err(|e| LabelMappingError {
            path: path.display().to_string(),
            reason: format!("cannot read sidecar: {}", e),
        })?;

        let sidecar: LabelSidecar = serde_json::from_str(&raw).map_err(|e| LabelMappingError {
            path: path.display().to_string(),
            reason: format!("malformed sidecar: {}", e),
        })?;

        if sidecar.labels.is_empty() {
            return Err(LabelMappingError {
                path: path.display().to_string(),
                reason: "sidecar defines no labels".to_string(),
            });
        }

        let mut mapping = Vec::with_capacity(sidecar.labels.len());
        for (key, value) in &sidecar.labels {
            let raw_label: i64 = key.parse().map_err(|_| LabelMappingError {
                path: path.display().to_string(),
                reason: format!("label key {:?} is not an integer", key),
            })?;
            let verdict = match value.as_str() {
                "phishing" => Verdict::Phishing,
                "safe" => Verdict::Safe,
                other => {
                    return Err(LabelMappingError {
                        path: path.display().to_string(),
                        reason: format!("unknown semantic label {:?}", other),
                    })
                }
            };
            mapping.push((raw_label, verdict));
        }
        mapping.sort_by_key(|(raw, _)| *raw);

        Ok(Self {
            mapping,
            verified: sidecar.verified,
            verified_on: sidecar.verified_on,
            model_sha256: sidecar.model_sha256,
            feature_version: sidecar.feature_version,
            feature_layout_hash: sidecar.feature_layout_hash,
        })
    }

    /// Semantic verdict for a raw model label, if the sidecar maps it
    pub fn verdict_for(&self, raw_label: i64) -> Option<Verdict> {
        self.mapping
            .iter()
            .find(|(raw, _)| *raw == raw_label)
            .map(|(_, verdict)| *verdict)
    }

    /// Number of mapped labels
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    #[cfg(test)]
    pub fn for_tests(mapping: Vec<(i64, Verdict)>) -> Self {
        Self {
            mapping,
            verified: true,
            verified_on: None,
            model_sha256: None,
            feature_version: None,
            feature_layout_hash: None,
        }
    }
}

// ============================================================================
// ERROR
// ============================================================================

#[derive(Debug, Clone)]
pub struct LabelMappingError {
    pub path: String,
    pub reason: String,
}

impl std::fmt::Display for LabelMappingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "label sidecar {}: {}", self.path, self.reason)
    }
}

impl std::error::Error for LabelMappingError {}

// ============================================================================
// TESTS
// ============================================================================

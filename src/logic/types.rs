//! Core Data Model - Requests, Verdicts, Results
//!
//! Wire-visible shapes for the prediction pipeline. A `RawRequest` is what the
//! boundary layer hands us; it becomes a strongly-typed `PredictionRequest`
//! only after `validate` succeeds. Nothing downstream of validation re-checks
//! field presence.

use serde::{Deserialize, Serialize};

// ============================================================================
// CONTENT TYPE
// ============================================================================

/// What kind of text a request carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Email,
    Url,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Email => "email",
            ContentType::Url => "url",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// REQUESTS
// ============================================================================

/// Unvalidated request as received from the boundary layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRequest {
    #[serde(default)]
    pub text: String,
    /// "email" or "url"; anything else is rejected by the validator
    #[serde(rename = "type", default)]
    pub content_type: String,
}

impl RawRequest {
    pub fn new(text: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            content_type: content_type.into(),
        }
    }
}

/// Validated, strongly-typed prediction request
///
/// Only the validator constructs this. The text is trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    pub text: String,
    pub content_type: ContentType,
}

// ============================================================================
// VERDICT & RISK
// ============================================================================

/// Semantic classification verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Phishing,
    Safe,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Phishing => f.write_str("Phishing"),
            Verdict::Safe => f.write_str("Safe"),
        }
    }
}

/// Risk tier derived from (verdict, confidence), never from the model directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

// ============================================================================
// RESULTS
// ============================================================================

/// Single prediction result, created per request and never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: Verdict,
    /// max(class probabilities), rounded to 4 decimals
    pub confidence: f32,
    pub risk_level: RiskLevel,
    pub content_type: ContentType,
    /// Unmapped integer the model produced (diagnostic)
    pub raw_label: i64,
}

/// Per-item outcome of a batch request
///
/// Ordering invariant: result at position i corresponds to input item i.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PredictionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    pub fn ok(index: usize, data: PredictionResult) -> Self {
        Self {
            index,
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(index: usize, error: impl Into<String>) -> Self {
        Self {
            index,
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Batch result plus aggregate metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub results: Vec<BatchItemResult>,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_request_wire_field_names() {
        let req: RawRequest = serde_json::from_str(r#"{"text":"hello","type":"email"}"#).unwrap();
        assert_eq!(req.text, "hello");
        assert_eq!(req.content_type, "email");
    }

    #[test]
    fn test_raw_request_missing_fields_default_empty() {
        let req: RawRequest = serde_json::from_str("{}").unwrap();
        assert!(req.text.is_empty());
        assert!(req.content_type.is_empty());
    }

    #[test]
    fn test_content_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ContentType::Email).unwrap(), "\"email\"");
        assert_eq!(serde_json::to_string(&ContentType::Url).unwrap(), "\"url\"");
    }

    #[test]
    fn test_batch_item_result_skips_absent_sides() {
        let item = BatchItemResult::err(3, "bad input");
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"index\":3"));
        assert!(json.contains("\"error\""));
        assert!(!json.contains("\"data\""));
    }
}

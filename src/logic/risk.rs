//! Risk Interpretation
//!
//! Maps (verdict, confidence) to a risk tier. Deterministic, total, pure -
//! the tier is derived from the semantic verdict, never from the model
//! directly.

use crate::constants::{HIGH_RISK_CONFIDENCE, MEDIUM_RISK_CONFIDENCE};
use crate::logic::types::{RiskLevel, Verdict};

/// Risk tier for a classified input.
///
/// Safe verdicts are always Low regardless of confidence. Phishing verdicts
/// tier by confidence: >= 0.8 High, >= 0.6 Medium, below that Low (the model
/// leans phishing but is too unsure to raise an alarm).
pub fn risk_level(verdict: Verdict, confidence: f32) -> RiskLevel {
    match verdict {
        Verdict::Safe => RiskLevel::Low,
        Verdict::Phishing => {
            if confidence >= HIGH_RISK_CONFIDENCE {
                RiskLevel::High
            } else if confidence >= MEDIUM_RISK_CONFIDENCE {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

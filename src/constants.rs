//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change model locations or limits, only edit this file.

/// Default directory containing the trained classifier files
pub const DEFAULT_MODELS_DIR: &str = "models/saved_models";

/// Email classifier model file name
pub const EMAIL_MODEL_FILE: &str = "email_classifier.onnx";

/// URL classifier model file name
pub const URL_MODEL_FILE: &str = "url_classifier.onnx";

/// Minimum accepted input text length (characters, after trim)
pub const MIN_TEXT_LEN: usize = 3;

/// Maximum accepted input text length (characters)
pub const MAX_TEXT_LEN: usize = 10_000;

/// Maximum accepted URL length (characters)
pub const MAX_URL_LEN: usize = 2_048;

/// Minimum word count for an email body
pub const MIN_EMAIL_WORDS: usize = 2;

/// Maximum number of items in one batch request
pub const MAX_BATCH_SIZE: usize = 50;

/// Phishing verdicts at or above this confidence are High risk
pub const HIGH_RISK_CONFIDENCE: f32 = 0.8;

/// Phishing verdicts at or above this confidence are Medium risk
pub const MEDIUM_RISK_CONFIDENCE: f32 = 0.6;

/// Fallback feature count for the URL model when the session
/// does not report a static input shape
pub const DEFAULT_URL_FEATURES: usize = 30;

/// Fallback vector width for the email model when the session
/// does not report a static input shape
pub const DEFAULT_EMAIL_FEATURES: usize = 4096;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "phishing-core";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get models directory from environment or use default
pub fn get_models_dir() -> String {
    std::env::var("PHISHING_MODELS_DIR")
        .unwrap_or_else(|_| DEFAULT_MODELS_DIR.to_string())
}

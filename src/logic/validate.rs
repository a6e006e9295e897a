//! Input Validator
//!
//! Guards every inbound request before it reaches the pipeline. Checks run
//! in a fixed order and short-circuit on the first failure; the output is
//! the strongly-typed `PredictionRequest`, so no downstream stage re-checks
//! field presence. Validation reasons are user-facing by design.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{MAX_BATCH_SIZE, MAX_TEXT_LEN, MAX_URL_LEN, MIN_EMAIL_WORDS, MIN_TEXT_LEN};
use crate::logic::types::{ContentType, PredictionRequest, RawRequest};

// Patterns an email body is never allowed to carry into the pipeline
static RE_SCRIPT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static RE_JS_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)javascript:").unwrap());
static RE_DATA_HTML: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)data:text/html").unwrap());

// Strict URL grammar: scheme + (domain | localhost | IPv4) + optional port/path
static RE_URL_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:http|ftp)s?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .unwrap()
});

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// Malformed, missing, oversized, or disallowed input.
/// Always locally recoverable; the message is safe to show the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingType,
    InvalidType { given: String },
    EmptyText,
    TooShort { len: usize },
    TooLong { len: usize },
    UrlTooLong { len: usize },
    TooFewWords,
    MaliciousPattern,
    InvalidUrl,
    EmptyBatch,
    BatchTooLarge { len: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingType => write!(f, "Type field is required"),
            ValidationError::InvalidType { given } => {
                write!(f, "Type must be one of: email, url (got {:?})", given)
            }
            ValidationError::EmptyText => write!(f, "Text content cannot be empty"),
            ValidationError::TooShort { .. } => {
                write!(f, "Text content is too short (min {} characters)", MIN_TEXT_LEN)
            }
            ValidationError::TooLong { .. } => {
                write!(f, "Text content is too long (max {} characters)", MAX_TEXT_LEN)
            }
            ValidationError::UrlTooLong { .. } => {
                write!(f, "URL is too long (max {} characters)", MAX_URL_LEN)
            }
            ValidationError::TooFewWords => {
                write!(f, "Email content must contain at least {} words", MIN_EMAIL_WORDS)
            }
            ValidationError::MaliciousPattern => {
                write!(f, "Email content contains potentially malicious patterns")
            }
            ValidationError::InvalidUrl => write!(f, "Invalid URL format"),
            ValidationError::EmptyBatch => write!(f, "Items must be a non-empty array"),
            ValidationError::BatchTooLarge { .. } => {
                write!(f, "Batch size cannot exceed {} items", MAX_BATCH_SIZE)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// VALIDATION
// ============================================================================

/// Validate a raw request into a typed `PredictionRequest`.
///
/// Order, short-circuiting on first failure: type present and valid, text
/// non-empty after trim, length within bounds (URLs additionally capped),
/// then content-type-specific checks.
pub fn validate(raw: &RawRequest) -> Result<PredictionRequest, ValidationError> {
    if raw.content_type.is_empty() {
        return Err(ValidationError::MissingType);
    }
    // Exact match only: "EMAIL" and "email " are rejected, not coerced
    let content_type = match raw.content_type.as_str() {
        "email" => ContentType::Email,
        "url" => ContentType::Url,
        _ => {
            return Err(ValidationError::InvalidType {
                given: raw.content_type.clone(),
            })
        }
    };

    let text = raw.text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyText);
    }

    let len = text.chars().count();
    if len < MIN_TEXT_LEN {
        return Err(ValidationError::TooShort { len });
    }
    if len > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong { len });
    }

    match content_type {
        ContentType::Email => validate_email_content(text)?,
        ContentType::Url => {
            if len > MAX_URL_LEN {
                return Err(ValidationError::UrlTooLong { len });
            }
            validate_url_content(text)?;
        }
    }

    Ok(PredictionRequest {
        text: text.to_string(),
        content_type,
    })
}

/// Batch-level checks: reject wholesale when empty or over the size cap
pub fn validate_batch_size(len: usize) -> Result<(), ValidationError> {
    if len == 0 {
        return Err(ValidationError::EmptyBatch);
    }
    if len > MAX_BATCH_SIZE {
        return Err(ValidationError::BatchTooLarge { len });
    }
    Ok(())
}

fn validate_email_content(text: &str) -> Result<(), ValidationError> {
    if text.split_whitespace().count() < MIN_EMAIL_WORDS {
        return Err(ValidationError::TooFewWords);
    }

    if RE_SCRIPT_TAG.is_match(text) || RE_JS_SCHEME.is_match(text) || RE_DATA_HTML.is_match(text) {
        return Err(ValidationError::MaliciousPattern);
    }

    Ok(())
}

fn validate_url_content(text: &str) -> Result<(), ValidationError> {
    let test_url = if text.starts_with("http://") || text.starts_with("https://") {
        text.to_string()
    } else {
        format!("http://{}", text)
    };

    if RE_URL_GRAMMAR.is_match(&test_url) {
        return Ok(());
    }

    // Lenient fallback: accept anything with a non-empty host portion
    let rest = match test_url.find("://") {
        Some(pos) => &test_url[pos + 3..],
        None => test_url.as_str(),
    };
    let host = rest.split('/').next().unwrap_or("");
    if host.is_empty() {
        return Err(ValidationError::InvalidUrl);
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

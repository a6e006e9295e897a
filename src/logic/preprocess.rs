//! Text Preprocessing - Email Normalization
//!
//! Deterministic, total text-to-text cleanup. `normalize_email` never fails;
//! the worst input yields an empty string. The step order is fixed and must
//! not be rearranged: the trained email model saw text produced by exactly
//! this pipeline. URL text is deliberately not preprocessed; the URL feature
//! extractor consumes it as validated.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_HYPERLINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+|www\S+").unwrap());
static RE_EMAIL_ADDR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+").unwrap());
static RE_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").unwrap());
static RE_HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Normalize an email body for classification.
///
/// Pipeline, in order: strip hyperlink tokens, strip email addresses, strip
/// phone numbers, strip HTML tags, collapse whitespace, lowercase, strip
/// ASCII punctuation, strip digit runs, collapse whitespace, trim.
///
/// Idempotent: `normalize_email(normalize_email(x)) == normalize_email(x)`.
/// The trailing whitespace collapse is what guarantees that; punctuation and
/// digit removal can leave interior double spaces behind.
pub fn normalize_email(text: &str) -> String {
    let text = RE_HYPERLINK.replace_all(text, "");
    let text = RE_EMAIL_ADDR.replace_all(&text, "");
    let text = RE_PHONE.replace_all(&text, "");
    let text = RE_HTML_TAG.replace_all(&text, "");
    let text = RE_WHITESPACE.replace_all(&text, " ");
    let text = text.to_lowercase();
    let text: String = text.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    let text = RE_DIGITS.replace_all(&text, "");
    let text = RE_WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_hyperlinks_and_lowercases() {
        let out = normalize_email("Urgent! Verify your account now: http://fake-bank.com/verify");
        assert!(!out.contains("http"));
        assert!(out.chars().all(|c| !c.is_uppercase()));
        assert!(out.contains("urgent verify your account now"));
    }

    #[test]
    fn test_strips_email_addresses() {
        let out = normalize_email("contact support@bank-example.com for help");
        assert!(!out.contains('@'));
        assert_eq!(out, "contact for help");
    }

    #[test]
    fn test_strips_phone_numbers() {
        assert_eq!(normalize_email("call 555-123-4567 today"), "call today");
        assert_eq!(normalize_email("call 555.123.4567 today"), "call today");
    }

    #[test]
    fn test_strips_html_tags() {
        assert_eq!(normalize_email("<div>Hello <b>World</b></div>"), "hello world");
    }

    #[test]
    fn test_strips_punctuation_and_digits() {
        assert_eq!(normalize_email("Win $1,000,000 now!!!"), "win now");
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert_eq!(normalize_email(""), "");
        assert_eq!(normalize_email("   \n\t  "), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Urgent! Verify NOW: http://fake-bank.com/verify",
            "a - b c 12 d",
            "<p>Mixed   content</p> user@host.com 555-123-4567",
            "",
            "already clean lowercase words",
        ];
        for s in samples {
            let once = normalize_email(s);
            let twice = normalize_email(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", s);
        }
    }
}

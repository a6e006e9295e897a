//! URL Feature Extractor - Tri-State Heuristic Encoding
//!
//! Encodes a URL into the fixed-length numeric vector the URL model consumes.
//! Each heuristic is tri-state: -1 = legitimate-leaning, 0 = suspicious,
//! 1 = phishing-leaning (some signals are binary -1/1).
//!
//! Slots past the seven computed heuristics are filled with the neutral value
//! 0.0. This is a deliberate, documented approximation: the model was trained
//! on a wider feature set (SSL state, domain age, page rank, ...) that cannot
//! be computed from the URL text alone. Do not "improve" the padding; the
//! model's behavior depends on it.
//!
//! No error path: malformed URL text yields the per-heuristic default and the
//! result always has exactly the requested length.

use once_cell::sync::Lazy;
use regex::Regex;

use super::layout::HEURISTIC_COUNT;

static RE_IP_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").unwrap());

/// Known link-shortener domains
const SHORTENING_SERVICES: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "goo.gl",
    "t.co",
    "short.link",
    "ow.ly",
    "is.gd",
];

/// Extract the heuristic feature vector for a URL.
///
/// Always returns exactly `expected_dim` values; truncates the heuristics
/// when `expected_dim < 7` and zero-pads beyond them.
pub fn extract(url: &str, expected_dim: usize) -> Vec<f32> {
    let host = host_of(url);

    let heuristics: [f32; HEURISTIC_COUNT] = [
        has_ip_address(url),
        url_length_bucket(url.len()),
        has_shortening_service(url),
        if url.contains('@') { 1.0 } else { -1.0 },
        has_double_slash_redirect(url),
        if host.contains('-') { 1.0 } else { -1.0 },
        subdomain_bucket(host),
    ];

    let mut features = Vec::with_capacity(expected_dim);
    features.extend(heuristics.iter().take(expected_dim));
    features.resize(expected_dim, 0.0);
    features
}

/// Host portion of the URL: between the scheme separator and the first
/// `/`, `?` or `#`. Tolerant of missing schemes and garbage input.
fn host_of(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(pos) => &url[pos + 3..],
        None => url,
    };
    let end = rest
        .find(|c| c == '/' || c == '?' || c == '#')
        .unwrap_or(rest.len());
    &rest[..end]
}

fn has_ip_address(url: &str) -> f32 {
    if RE_IP_LITERAL.is_match(url) {
        1.0
    } else {
        -1.0
    }
}

fn url_length_bucket(length: usize) -> f32 {
    if length < 54 {
        -1.0 // Legitimate
    } else if length <= 75 {
        0.0 // Suspicious
    } else {
        1.0 // Phishing
    }
}

fn has_shortening_service(url: &str) -> f32 {
    let lower = url.to_lowercase();
    if SHORTENING_SERVICES.iter().any(|s| lower.contains(s)) {
        1.0
    } else {
        -1.0
    }
}

fn has_double_slash_redirect(url: &str) -> f32 {
    if url.matches("//").count() > 1 {
        1.0
    } else {
        -1.0
    }
}

fn subdomain_bucket(host: &str) -> f32 {
    if host.is_empty() {
        return -1.0;
    }
    match host.matches('.').count() {
        0 | 1 => -1.0, // Legitimate
        2 => 0.0,      // Suspicious
        _ => 1.0,      // Phishing
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! URL Heuristic Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the URL feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add heuristic → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove heuristic → increment FEATURE_VERSION
//!
//! The URL model was trained against vectors laid out in exactly this order;
//! a silent reorder would feed every signal to the wrong model input.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current heuristic layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// HEURISTIC LAYOUT (Authoritative source)
// ============================================================================

/// Heuristic names in the exact order they appear in the vector.
/// This is the SINGLE SOURCE OF TRUTH for the URL feature layout.
pub const HEURISTIC_LAYOUT: &[&str] = &[
    "having_ip_address",        // 0: IP literal in host (binary -1/1)
    "url_length",               // 1: <54 → -1, 54..=75 → 0, >75 → 1
    "shortening_service",       // 2: known link shortener (binary -1/1)
    "having_at_symbol",         // 3: '@' anywhere in URL (binary -1/1)
    "double_slash_redirecting", // 4: more than one "//" (binary -1/1)
    "prefix_suffix",            // 5: hyphen in host (binary -1/1)
    "having_sub_domain",        // 6: host dots ≤1 → -1, 2 → 0, >2 → 1
];

/// Number of computed heuristics
/// IMPORTANT: Must match HEURISTIC_LAYOUT.len()!
pub const HEURISTIC_COUNT: usize = 7;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the heuristic layout.
/// Used so a model sidecar can detect an extractor mismatch at load time.
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in HEURISTIC_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }
    hasher.finalize()
}

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub heuristic_count: usize,
    pub heuristic_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            heuristic_count: HEURISTIC_COUNT,
            heuristic_names: HEURISTIC_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Check if a recorded layout is compatible (same version, same hash)
pub fn is_layout_compatible(version: u8, hash: u32) -> bool {
    version == FEATURE_VERSION && hash == layout_hash()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_count() {
        assert_eq!(HEURISTIC_COUNT, 7);
        assert_eq!(HEURISTIC_LAYOUT.len(), HEURISTIC_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_layout_compatibility() {
        assert!(is_layout_compatible(FEATURE_VERSION, layout_hash()));
        assert!(!is_layout_compatible(FEATURE_VERSION + 1, layout_hash()));
        assert!(!is_layout_compatible(FEATURE_VERSION, layout_hash().wrapping_add(1)));
    }

    #[test]
    fn test_layout_info_reflects_current_layout() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.hash, layout_hash());
        assert_eq!(info.heuristic_count, HEURISTIC_COUNT);
        assert_eq!(info.heuristic_names.len(), HEURISTIC_COUNT);
    }
}

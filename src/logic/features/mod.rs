//! Features Module - Model Input Encoding
//!
//! Turns cleaned text into the numeric vectors the classifiers consume:
//! - `url` - tri-state heuristic extraction for the URL model
//! - `text` - hashed token vectorizer for the email model
//! - `layout` - authoritative URL heuristic schema + version hash

pub mod layout;
pub mod text;
pub mod url;

// Re-export common items
pub use layout::{layout_hash, LayoutInfo, FEATURE_VERSION, HEURISTIC_COUNT, HEURISTIC_LAYOUT};

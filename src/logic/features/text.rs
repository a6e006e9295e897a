//! Hashed Token Vectorizer - Email Model Front-End
//!
//! Turns normalized email text into the fixed-width f32 vector the email
//! model consumes. Tokens are whitespace-split, bucketed by CRC32 modulo the
//! model's input width, counted, then L2-normalized.
//!
//! The training export ships a front-end with identical hashing, so this
//! mapping is part of the model contract: changing the hash function or the
//! normalization invalidates every deployed email model.

use crc32fast::Hasher;

/// Vectorize normalized text into exactly `dim` values.
///
/// Total and deterministic; empty text (or `dim == 0`) yields the zero
/// vector of the requested length.
pub fn vectorize(text: &str, dim: usize) -> Vec<f32> {
    let mut features = vec![0.0f32; dim];
    if dim == 0 {
        return features;
    }

    for token in text.split_whitespace() {
        let bucket = (token_hash(token) as usize) % dim;
        features[bucket] += 1.0;
    }

    let norm = features.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in features.iter_mut() {
            *v /= norm;
        }
    }

    features
}

fn token_hash(token: &str) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(token.as_bytes());
    hasher.finalize()
}

// ============================================================================
// TESTS
// ============================================================================

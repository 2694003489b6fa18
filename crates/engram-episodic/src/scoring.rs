// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cosine similarity with the "similarity unknown" sentinel.

/// Cosine similarity between two embedding vectors.
///
/// Returns the sentinel **-1.0** when either vector is empty, has zero
/// norm, or the dimensions differ. The sentinel ranks a candidate lowest
/// without excluding it, so facts with unknown similarity still surface
/// when nothing better exists.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return -1.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += f64::from(x) * f64::from(y);
        norm_a += f64::from(x) * f64::from(x);
        norm_b += f64::from(y) * f64::from(y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return -1.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

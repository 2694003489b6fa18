// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding collaborator trait.

use async_trait::async_trait;

use crate::error::EngramError;

/// The external embedding service.
///
/// Returns a vector of the backend's fixed dimension. Callers map any
/// failure to the empty-vector "similarity unknown" sentinel rather than
/// propagating the error.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generates an embedding for the given text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngramError>;
}

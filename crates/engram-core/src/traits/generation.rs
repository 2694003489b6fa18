// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation collaborator trait.

use async_trait::async_trait;

use crate::error::EngramError;
use crate::types::GenerationOptions;

/// The external text-generation service.
///
/// Any failure (timeout, transport error, non-success status) surfaces as
/// [`EngramError::Collaborator`]; callers apply exactly one documented
/// fallback per call site and never retry internally.
///
/// [`EngramError::Collaborator`]: crate::error::EngramError::Collaborator
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Sends a system/user prompt pair and returns the completion text.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, EngramError>;
}

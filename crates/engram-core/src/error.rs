// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Engram memory engine.
//!
//! The taxonomy follows the engine's recovery contract: collaborator
//! failures (generation, embedding) are always recovered at the call site
//! via a documented fallback; store failures are the one condition that is
//! fatal to a turn.

use thiserror::Error;

/// Which external collaborator an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CollaboratorKind {
    /// The text-generation service.
    Generation,
    /// The embedding service.
    Embedding,
}

/// The primary error type used across all Engram crates.
#[derive(Debug, Error)]
pub enum EngramError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Document store errors (connection, query failure, serialization).
    /// The only error kind that is fatal to a turn.
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A generation or embedding collaborator call failed (timeout,
    /// transport error, non-success status). Recovered locally by the
    /// calling component; never surfaced raw to the engine's caller.
    #[error("{kind} collaborator unavailable: {message}")]
    Collaborator {
        kind: CollaboratorKind,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A collaborator responded but its output could not be parsed.
    /// Recovered via the same normalization/fallback path as unavailability.
    #[error("malformed {kind} output: {message}")]
    Malformed {
        kind: CollaboratorKind,
        message: String,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngramError {
    /// True when the error is recoverable at the call site per the engine's
    /// fallback contract (anything except a store failure).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngramError::Store { .. })
    }
}

// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Abstractive summarization for the Engram memory engine.
//!
//! [`Summarizer`] watches the per-session user-message count and
//! regenerates the session summary (and periodically the lifetime summary)
//! through the generation collaborator. [`normalize::normalize_summary`]
//! guarantees the bullet-shape contract no matter what the collaborator
//! returned.

pub mod normalize;
pub mod summarizer;

pub use normalize::normalize_summary;
pub use summarizer::Summarizer;

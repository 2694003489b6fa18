// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Episodic memory subsystem for the Engram memory engine.
//!
//! Three pieces: the [`extractor`] turns one user utterance into at most
//! three weighted facts, [`retriever::EpisodicMemory`] persists them with
//! embeddings and answers blended-score queries, and [`scoring`] holds the
//! cosine routine with its "similarity unknown" sentinel.

pub mod extractor;
pub mod retriever;
pub mod scoring;

pub use extractor::{EpisodeExtractor, ExtractedFact};
pub use retriever::EpisodicMemory;
pub use scoring::cosine_similarity;

// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! The engine depends on three external capabilities it does not implement:
//! a generation service, an embedding service, and a document store. Each is
//! expressed as an async trait so implementations can be swapped (and mocked
//! in tests) without touching the engine.

pub mod embedding;
pub mod generation;
pub mod store;

pub use embedding::EmbeddingProvider;
pub use generation::GenerationProvider;
pub use store::DocumentStore;

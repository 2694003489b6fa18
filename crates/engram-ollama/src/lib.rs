// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama collaborator client for the Engram memory engine.
//!
//! One [`OllamaClient`] serves both collaborator roles: it implements
//! `GenerationProvider` over `/api/chat` and `EmbeddingProvider` over
//! `/api/embeddings`.

pub mod client;
pub mod types;

pub use client::OllamaClient;

// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Ollama `/api/chat` and `/api/embeddings` endpoints.

use engram_core::GenerationOptions;
use serde::{Deserialize, Serialize};

/// A single chat message in an Ollama request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// "system", "user", or "assistant".
    pub role: String,
    /// Message text.
    pub content: String,
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier, e.g. "phi3:mini".
    pub model: String,
    /// Conversation messages, system first.
    pub messages: Vec<ChatMessage>,
    /// Always false; the engine consumes whole replies.
    pub stream: bool,
    /// Sampling options, omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerationOptions>,
}

/// The assistant message inside a chat response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseMessage {
    /// Role echoed by the server, normally "assistant".
    #[serde(default)]
    pub role: String,
    /// Generated text.
    #[serde(default)]
    pub content: String,
}

/// Response body for `POST /api/chat` (non-streaming).
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// The generated message.
    pub message: ChatResponseMessage,
    /// True once generation is complete.
    #[serde(default)]
    pub done: bool,
}

/// Request body for `POST /api/embeddings`.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingsRequest {
    /// Embedding model identifier, e.g. "nomic-embed-text".
    pub model: String,
    /// Text to embed.
    pub prompt: String,
}

/// Response body for `POST /api/embeddings`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsResponse {
    /// The embedding vector. Ollama emits f64 values; they are narrowed to
    /// f32 at the client boundary.
    #[serde(default)]
    pub embedding: Vec<f64>,
}

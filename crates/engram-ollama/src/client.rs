// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a local Ollama server.
//!
//! Provides [`OllamaClient`], implementing both collaborator traits over
//! `/api/chat` (non-streaming) and `/api/embeddings`. The client makes a
//! single attempt per request; callers own every fallback, so no retry or
//! queueing happens here.

use std::time::Duration;

use async_trait::async_trait;
use engram_config::OllamaConfig;
use engram_core::{
    CollaboratorKind, EmbeddingProvider, EngramError, GenerationOptions, GenerationProvider,
};
use tracing::debug;

use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, EmbeddingsRequest, EmbeddingsResponse,
};

/// HTTP client for Ollama chat and embedding endpoints.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    chat_model: String,
    embed_model: String,
}

impl OllamaClient {
    /// Creates a new Ollama client from configuration.
    pub fn new(config: &OllamaConfig) -> Result<Self, EngramError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngramError::Collaborator {
                kind: CollaboratorKind::Generation,
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            embed_model: config.embed_model.clone(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured chat model identifier.
    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// Returns the configured embedding model identifier.
    pub fn embed_model(&self) -> &str {
        &self.embed_model
    }
}

#[async_trait]
impl GenerationProvider for OllamaClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, EngramError> {
        let mut messages = Vec::with_capacity(2);
        if !system_prompt.is_empty() {
            messages.push(ChatMessage {
                role: "system".into(),
                content: system_prompt.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".into(),
            content: user_prompt.to_string(),
        });

        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages,
            stream: false,
            options: if options.is_empty() {
                None
            } else {
                Some(options.clone())
            },
        };

        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngramError::Collaborator {
                kind: CollaboratorKind::Generation,
                message: format!("chat request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.chat_model, "chat response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngramError::Collaborator {
                kind: CollaboratorKind::Generation,
                message: format!("chat endpoint returned {status}: {body}"),
                source: None,
            });
        }

        let body = response.text().await.map_err(|e| EngramError::Collaborator {
            kind: CollaboratorKind::Generation,
            message: format!("failed to read chat response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|_| EngramError::Malformed {
                kind: CollaboratorKind::Generation,
                message: "chat response is not the expected JSON shape".to_string(),
            })?;

        Ok(parsed.message.content)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngramError> {
        let request = EmbeddingsRequest {
            model: self.embed_model.clone(),
            prompt: text.to_string(),
        };

        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngramError::Collaborator {
                kind: CollaboratorKind::Embedding,
                message: format!("embeddings request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.embed_model, "embeddings response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngramError::Collaborator {
                kind: CollaboratorKind::Embedding,
                message: format!("embeddings endpoint returned {status}: {body}"),
                source: None,
            });
        }

        let parsed: EmbeddingsResponse =
            response
                .json()
                .await
                .map_err(|_| EngramError::Malformed {
                    kind: CollaboratorKind::Embedding,
                    message: "embeddings response is not the expected JSON shape".to_string(),
                })?;

        Ok(parsed.embedding.into_iter().map(|v| v as f32).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OllamaClient {
        OllamaClient::new(&OllamaConfig::default())
            .unwrap()
            .with_base_url(base_url.to_string())
    }

    #[tokio::test]
    async fn complete_returns_message_content() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "model": "phi3:mini",
            "message": {"role": "assistant", "content": "Hi there!"},
            "done": true
        });

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({"stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply = client
            .complete("You are helpful.", "Hello", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(reply, "Hi there!");
    }

    #[tokio::test]
    async fn complete_omits_empty_system_prompt() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"role": "user", "content": "just me"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"role": "assistant", "content": "ok"},
                "done": true
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply = client
            .complete("", "just me", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn complete_maps_500_to_collaborator_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .complete("sys", "hi", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngramError::Collaborator {
                kind: CollaboratorKind::Generation,
                ..
            }
        ));
        // A failed request is never silently retried here.
        server.verify().await;
    }

    #[tokio::test]
    async fn complete_maps_bad_json_to_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .complete("sys", "hi", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngramError::Malformed {
                kind: CollaboratorKind::Generation,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn embed_narrows_f64_vector() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_partial_json(serde_json::json!({
                "model": "nomic-embed-text",
                "prompt": "morning run"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embedding": [0.25, -1.5, 3.0]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let vector = client.embed("morning run").await.unwrap();
        assert_eq!(vector, vec![0.25f32, -1.5, 3.0]);
    }

    #[tokio::test]
    async fn embed_maps_failure_to_collaborator_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.embed("text").await.unwrap_err();
        assert!(matches!(
            err,
            EngramError::Collaborator {
                kind: CollaboratorKind::Embedding,
                ..
            }
        ));
    }
}

// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Engram memory engine.
//!
//! This crate provides the foundational trait definitions, error taxonomy,
//! and domain types used throughout the Engram workspace. Collaborator
//! implementations (generation, embedding, document store) implement traits
//! defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{CollaboratorKind, EngramError};
pub use traits::{DocumentStore, EmbeddingProvider, GenerationProvider};
pub use types::{
    Episode, EpisodeDigest, EpisodicHit, GenerationOptions, MemorySnapshot, Message, Role,
    Summary, SummaryScope, TurnRequest, TurnResponse,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaborator_traits_are_object_safe() {
        // The engine holds collaborators as trait objects; if any trait
        // loses object safety this test won't compile.
        fn _assert_generation(_: &dyn GenerationProvider) {}
        fn _assert_embedding(_: &dyn EmbeddingProvider) {}
        fn _assert_store(_: &dyn DocumentStore) {}
    }

    #[test]
    fn turn_contract_serializes() {
        let response = TurnResponse {
            reply: "ok".into(),
            short_term_count: 3,
            latest_session_summary: None,
            latest_lifetime_summary: Some("- profile".into()),
            episodic_top_k: vec![EpisodicHit {
                fact: "runs at 7:30 AM".into(),
                importance: 0.8,
                score: 0.91,
            }],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"short_term_count\":3"));
        assert!(json.contains("\"episodic_top_k\""));

        let request: TurnRequest = serde_json::from_str(
            r#"{"user_id":"u1","message":"Help me sleep better"}"#,
        )
        .unwrap();
        assert_eq!(request.user_id, "u1");
        assert!(request.session_id.is_none());
    }
}

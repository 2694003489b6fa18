// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Episodic fact persistence and blended-score retrieval.

use std::sync::Arc;

use engram_config::EpisodicConfig;
use engram_core::types::iso_timestamp;
use engram_core::{DocumentStore, EmbeddingProvider, EngramError, Episode, EpisodicHit};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::extractor::ExtractedFact;
use crate::scoring::cosine_similarity;

/// Persists extracted facts and answers ranked retrieval queries.
///
/// Retrieval is deliberately approximate: it scans only the most recent
/// `candidate_scan_limit` episodes per user, ranking them by
/// `similarity_weight * cosine + importance_weight * importance`.
pub struct EpisodicMemory {
    store: Arc<dyn DocumentStore>,
    embedding: Arc<dyn EmbeddingProvider>,
    config: EpisodicConfig,
}

impl EpisodicMemory {
    /// Creates a new episodic memory over the given collaborators.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedding: Arc<dyn EmbeddingProvider>,
        config: EpisodicConfig,
    ) -> Self {
        Self {
            store,
            embedding,
            config,
        }
    }

    /// Embed and persist extracted facts.
    ///
    /// Embedding failure is not a storage failure: the episode is persisted
    /// with the empty-vector sentinel and remains retrievable by importance.
    /// Only store errors propagate.
    pub async fn store_facts(
        &self,
        user_id: &str,
        session_id: &str,
        facts: &[ExtractedFact],
    ) -> Result<(), EngramError> {
        for fact in facts {
            let embedding = match self.embedding.embed(&fact.fact).await {
                Ok(vector) => vector,
                Err(e) => {
                    warn!(error = %e, "embedding failed, persisting empty sentinel");
                    Vec::new()
                }
            };

            let episode = Episode {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                session_id: session_id.to_string(),
                fact: fact.fact.clone(),
                importance: fact.importance.clamp(0.0, 1.0),
                embedding,
                created_at: iso_timestamp(),
            };
            self.store.insert_episode(&episode).await?;
        }
        Ok(())
    }

    /// Retrieve the top-k episodes for a query, ranked by blended score.
    ///
    /// A failed query embedding degrades to the empty vector, which turns
    /// every cosine into the -1.0 sentinel and leaves ranking to stored
    /// importance alone.
    pub async fn retrieve_top_k(
        &self,
        user_id: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<EpisodicHit>, EngramError> {
        let query_vec = match self.embedding.embed(query).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "query embedding failed, ranking by importance only");
                Vec::new()
            }
        };

        let candidates = self
            .store
            .recent_episodes(user_id, self.config.candidate_scan_limit)
            .await?;
        debug!(candidates = candidates.len(), "scoring episodic candidates");

        let mut scored: Vec<EpisodicHit> = candidates
            .into_iter()
            .map(|episode| {
                let similarity = cosine_similarity(&query_vec, &episode.embedding);
                let score = self.config.similarity_weight * similarity
                    + self.config.importance_weight * episode.importance;
                EpisodicHit {
                    fact: episode.fact,
                    importance: episode.importance,
                    score,
                }
            })
            .collect();

        // Stable sort keeps the newest-first candidate order among ties.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}

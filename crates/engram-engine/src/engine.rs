// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The memory engine: one conversational turn end to end.

use std::collections::HashSet;
use std::sync::Arc;

use engram_config::EngramConfig;
use engram_context::{assemble_prompt, REPLY_SYS};
use engram_core::types::iso_timestamp;
use engram_core::{
    DocumentStore, EmbeddingProvider, EngramError, EpisodeDigest, EpisodicHit, GenerationOptions,
    GenerationProvider, MemorySnapshot, Message, Role, Summary, SummaryScope, TurnRequest,
    TurnResponse,
};
use engram_episodic::{EpisodeExtractor, EpisodicMemory};
use engram_summary::Summarizer;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Session key used when a turn request carries no session id.
const DEFAULT_SESSION: &str = "default";

/// Reply used when the generation collaborator fails on the reply path.
/// The turn still succeeds; the degraded reply is persisted like any other.
const DEGRADED_REPLY: &str =
    "- I could not reach the language model just now\n- Your message was saved; memory is intact\n- Please try again in a moment";

/// Messages included in a memory snapshot.
const SNAPSHOT_MESSAGES: usize = 16;

/// Episodes included in a memory snapshot.
const SNAPSHOT_EPISODES: usize = 20;

/// Orchestrates conversational turns over the memory tiers.
///
/// Turns for different (user, session) pairs share no mutable state beyond
/// the append-only store, so the engine is cheap to clone into concurrent
/// tasks.
#[derive(Clone)]
pub struct MemoryEngine {
    store: Arc<dyn DocumentStore>,
    generation: Arc<dyn GenerationProvider>,
    extractor: Arc<EpisodeExtractor>,
    episodic: Arc<EpisodicMemory>,
    summarizer: Arc<Summarizer>,
    background: Arc<Mutex<JoinSet<()>>>,
    short_term_window: usize,
    top_k: usize,
}

impl MemoryEngine {
    /// Assemble an engine from its collaborators and configuration.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generation: Arc<dyn GenerationProvider>,
        embedding: Arc<dyn EmbeddingProvider>,
        config: &EngramConfig,
    ) -> Self {
        let extractor = Arc::new(EpisodeExtractor::new(
            generation.clone(),
            config.episodic.clone(),
        ));
        let episodic = Arc::new(EpisodicMemory::new(
            store.clone(),
            embedding,
            config.episodic.clone(),
        ));
        let summarizer = Arc::new(Summarizer::new(
            store.clone(),
            generation.clone(),
            config.summary.clone(),
            config.engine.short_term_window,
        ));

        Self {
            store,
            generation,
            extractor,
            episodic,
            summarizer,
            background: Arc::new(Mutex::new(JoinSet::new())),
            short_term_window: config.engine.short_term_window,
            top_k: config.engine.top_k,
        }
    }

    /// Run one conversational turn.
    ///
    /// Collaborator failures degrade per component and never surface here;
    /// the only fatal failure is losing the document store.
    pub async fn turn(&self, request: TurnRequest) -> Result<TurnResponse, EngramError> {
        let user_id = request.user_id.as_str();
        let session_id = request
            .session_id
            .as_deref()
            .unwrap_or(DEFAULT_SESSION)
            .to_string();
        info!(user_id, session_id = %session_id, "turn started");

        self.append(user_id, &session_id, Role::User, &request.message)
            .await?;

        // Fact extraction/storage/retrieval and context gathering have no
        // data dependency on each other; run them concurrently.
        let (episodic_hits, context) = tokio::join!(
            self.extract_store_retrieve(user_id, &session_id, &request.message),
            self.gather_context(user_id, &session_id),
        );
        let episodic_hits = dedup_hits(episodic_hits?);
        let (short_term, session_summary, lifetime_summary) = context?;

        let prompt = assemble_prompt(
            lifetime_summary.as_ref().map(|s| s.text.as_str()),
            session_summary.as_ref().map(|s| s.text.as_str()),
            &short_term,
            &episodic_hits,
            &request.message,
        );
        debug!(prompt_len = prompt.len(), "prompt assembled");

        let reply = match self
            .generation
            .complete(REPLY_SYS, &prompt, &GenerationOptions::default())
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "reply generation failed, returning degraded reply");
                DEGRADED_REPLY.to_string()
            }
        };

        self.append(user_id, &session_id, Role::Assistant, &reply)
            .await?;

        // Detached, best-effort: reply latency is independent of
        // summarization success or failure.
        let summarizer = self.summarizer.clone();
        let owner = user_id.to_string();
        let session = session_id.clone();
        self.background.lock().await.spawn(async move {
            if let Err(e) = summarizer.run_if_due(&owner, &session).await {
                warn!(error = %e, "background summarization failed");
            }
        });

        Ok(TurnResponse {
            reply,
            short_term_count: short_term.len(),
            latest_session_summary: session_summary.map(|s| s.text),
            latest_lifetime_summary: lifetime_summary.map(|s| s.text),
            episodic_top_k: episodic_hits,
        })
    }

    /// Wait for any in-flight background summarization to finish.
    ///
    /// The reply path never waits on summarization. One-shot drivers call
    /// this before exiting so a due summary is not cancelled along with the
    /// runtime; long-lived drivers need not call it at all.
    pub async fn flush_summaries(&self) {
        let mut tasks = self.background.lock().await;
        while tasks.join_next().await.is_some() {}
    }

    /// Regenerate the session summary now, off the cadence.
    ///
    /// Returns the new summary text, or `None` when the session has no
    /// messages to summarize.
    pub async fn force_summarize(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<String>, EngramError> {
        self.summarizer
            .regenerate_session_summary(user_id, session_id)
            .await?;
        let latest = self
            .store
            .latest_summary(user_id, SummaryScope::Session, Some(session_id))
            .await?;
        Ok(latest.map(|s| s.text))
    }

    /// Refresh the lifetime summary now, off the cadence.
    ///
    /// Returns the new summary text, or `None` when the user has no session
    /// summaries to condense yet.
    pub async fn force_lifetime(&self, user_id: &str) -> Result<Option<String>, EngramError> {
        self.summarizer.refresh_lifetime_summary(user_id).await?;
        let latest = self
            .store
            .latest_summary(user_id, SummaryScope::Lifetime, None)
            .await?;
        Ok(latest.map(|s| s.text))
    }

    /// Inspect one user's memory tiers: recent messages, both summaries,
    /// and recent episodes without their embeddings.
    pub async fn memory_snapshot(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<MemorySnapshot, EngramError> {
        let (messages, session_summary, lifetime_summary, episodes) = tokio::join!(
            self.store
                .recent_messages(user_id, session_id, SNAPSHOT_MESSAGES),
            self.store
                .latest_summary(user_id, SummaryScope::Session, Some(session_id)),
            self.store.latest_summary(user_id, SummaryScope::Lifetime, None),
            self.store.recent_episodes(user_id, SNAPSHOT_EPISODES),
        );
        Ok(MemorySnapshot {
            messages: messages?,
            session_summary: session_summary?.map(|s| s.text),
            lifetime_summary: lifetime_summary?.map(|s| s.text),
            episodes: episodes?
                .into_iter()
                .map(|e| EpisodeDigest {
                    fact: e.fact,
                    importance: e.importance,
                    created_at: e.created_at,
                })
                .collect(),
        })
    }

    /// Extract facts from the utterance, persist them, then retrieve the
    /// top-k episodic matches for the same utterance.
    async fn extract_store_retrieve(
        &self,
        user_id: &str,
        session_id: &str,
        message: &str,
    ) -> Result<Vec<EpisodicHit>, EngramError> {
        let facts = self.extractor.extract(message).await;
        debug!(count = facts.len(), "episodic facts extracted");
        self.episodic.store_facts(user_id, session_id, &facts).await?;
        self.episodic.retrieve_top_k(user_id, message, self.top_k).await
    }

    /// Fetch the short-term window and the latest summaries for both scopes.
    async fn gather_context(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<(Vec<Message>, Option<Summary>, Option<Summary>), EngramError> {
        let (short_term, session_summary, lifetime_summary) = tokio::join!(
            self.store
                .recent_messages(user_id, session_id, self.short_term_window),
            self.store
                .latest_summary(user_id, SummaryScope::Session, Some(session_id)),
            self.store.latest_summary(user_id, SummaryScope::Lifetime, None),
        );
        Ok((short_term?, session_summary?, lifetime_summary?))
    }

    async fn append(
        &self,
        user_id: &str,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> Result<(), EngramError> {
        let message = Message {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            created_at: iso_timestamp(),
        };
        self.store.append_message(&message).await
    }
}

/// Collapse hits whose facts differ only by letter case, keeping the first
/// (best-scored) occurrence of each.
fn dedup_hits(hits: Vec<EpisodicHit>) -> Vec<EpisodicHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| seen.insert(hit.fact.to_lowercase()))
        .collect()
}

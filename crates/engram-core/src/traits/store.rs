// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document store collaborator trait.

use async_trait::async_trait;

use crate::error::EngramError;
use crate::types::{Episode, Message, Role, Summary, SummaryScope};

/// Append-only collections for messages, summaries, and episodes.
///
/// The store must support filtered retrieval sorted by time with a limit,
/// and a count-by-filter operation used as the summarization clock. It must
/// accept concurrent inserts from independent turns without cross-row
/// locking. Store unavailability is the one failure mode that is fatal to a
/// turn; there is no fallback for losing the ability to persist state.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Appends a message to the (user, session) log.
    async fn append_message(&self, message: &Message) -> Result<(), EngramError>;

    /// Last `limit` messages for the scope by `created_at`, returned
    /// oldest first.
    async fn recent_messages(
        &self,
        user_id: &str,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, EngramError>;

    /// Number of messages in the scope with the given role.
    async fn count_messages(
        &self,
        user_id: &str,
        session_id: &str,
        role: Role,
    ) -> Result<u64, EngramError>;

    /// Inserts a new summary row (session summaries are insert-only).
    async fn insert_summary(&self, summary: &Summary) -> Result<(), EngramError>;

    /// Replaces the single lifetime summary row for the summary's user,
    /// creating it if absent.
    async fn replace_lifetime_summary(&self, summary: &Summary) -> Result<(), EngramError>;

    /// Most recent summary for the given scope. `session_id` is required for
    /// session scope and ignored for lifetime scope.
    async fn latest_summary(
        &self,
        user_id: &str,
        scope: SummaryScope,
        session_id: Option<&str>,
    ) -> Result<Option<Summary>, EngramError>;

    /// Most recent session summaries for a user across all sessions,
    /// newest first.
    async fn recent_session_summaries(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Summary>, EngramError>;

    /// Appends an episode. An empty embedding is a valid sentinel.
    async fn insert_episode(&self, episode: &Episode) -> Result<(), EngramError>;

    /// Most recent episodes for a user, newest first. `limit` is the
    /// retrieval candidate scan bound.
    async fn recent_episodes(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Episode>, EngramError>;
}

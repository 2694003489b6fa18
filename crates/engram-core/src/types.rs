// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain records and the turn contract shared across Engram crates.

use serde::{Deserialize, Serialize};

/// Author of a message within a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// A user-authored turn.
    User,
    /// An assistant-authored turn.
    Assistant,
}

impl Role {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse from SQLite string.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "assistant" => Role::Assistant,
            _ => Role::User,
        }
    }
}

/// One turn in the append-only per-(user, session) message log.
///
/// Never mutated after creation; ordering within a (user, session) scope is
/// monotonic by `created_at` with insertion order as the tie-break.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for this message.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Owning session within the user's history.
    pub session_id: String,
    /// Who authored the turn.
    pub role: Role,
    /// The turn text.
    pub content: String,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// Which tier an abstractive summary belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryScope {
    /// Per-session summary; a new row is inserted on every regeneration.
    Session,
    /// Per-user lifetime summary; a single row replaced in place.
    Lifetime,
}

impl SummaryScope {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryScope::Session => "session",
            SummaryScope::Lifetime => "lifetime",
        }
    }

    /// Parse from SQLite string.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "lifetime" => SummaryScope::Lifetime,
            _ => SummaryScope::Session,
        }
    }
}

/// An abstractive summary row.
///
/// `text` is always exactly N bullet lines (N=4 for session scope, N=5 for
/// lifetime), each prefixed `"- "` and at most the configured word limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Unique identifier for this summary row.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Present for session scope, absent for lifetime scope.
    pub session_id: Option<String>,
    /// Summary tier.
    pub scope: SummaryScope,
    /// Normalized bullet text.
    pub text: String,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// An atomic fact extracted from one user utterance.
///
/// Append-only; an empty `embedding` is a valid, permanent sentinel meaning
/// "similarity unknown", never an error state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Unique identifier for this episode.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Session the fact was extracted in.
    pub session_id: String,
    /// The fact text (at most 800 chars).
    pub fact: String,
    /// Importance weight, always clamped to [0, 1].
    pub importance: f64,
    /// Embedding vector of the backend's fixed dimension, or empty.
    #[serde(skip)]
    pub embedding: Vec<f32>,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// A retrieved episode with its blended relevance score.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodicHit {
    /// The fact text.
    pub fact: String,
    /// Stored importance weight.
    pub importance: f64,
    /// Blended similarity/importance score.
    pub score: f64,
}

/// Sampling options forwarded to the generation collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling cutoff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

impl GenerationOptions {
    /// True when no option is set; clients omit the options object entirely.
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.top_p.is_none() && self.num_predict.is_none()
    }
}

/// Input for one conversational turn.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnRequest {
    /// Owning user.
    pub user_id: String,
    /// Session key; defaults to `"default"` when absent.
    pub session_id: Option<String>,
    /// The user's utterance.
    pub message: String,
}

/// Output of one conversational turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    /// The assistant reply.
    pub reply: String,
    /// Number of messages in the short-term window used for this turn.
    pub short_term_count: usize,
    /// Latest session summary text, if one exists.
    pub latest_session_summary: Option<String>,
    /// Latest lifetime summary text, if one exists.
    pub latest_lifetime_summary: Option<String>,
    /// Top-k episodic matches used for this turn, deduplicated.
    pub episodic_top_k: Vec<EpisodicHit>,
}

/// Inspection view over one user's memory tiers.
#[derive(Debug, Clone, Serialize)]
pub struct MemorySnapshot {
    /// Recent messages for the session, oldest first.
    pub messages: Vec<Message>,
    /// Latest session summary text, if one exists.
    pub session_summary: Option<String>,
    /// Latest lifetime summary text, if one exists.
    pub lifetime_summary: Option<String>,
    /// Recent episodes, newest first, without embeddings.
    pub episodes: Vec<EpisodeDigest>,
}

/// An episode stripped to its inspectable fields.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeDigest {
    /// The fact text.
    pub fact: String,
    /// Stored importance weight.
    pub importance: f64,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// Current UTC time as the ISO 8601 millisecond format used for all
/// `created_at` columns.
pub fn iso_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Truncate a string to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

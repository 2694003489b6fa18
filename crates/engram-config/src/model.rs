// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Engram memory engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages. Every value
//! that shapes engine behavior (interval sizes, blend weights, bullet
//! counts, truncation lengths, scan bound) lives here as an explicit,
//! immutable setting passed into each component at construction.

use serde::{Deserialize, Serialize};

/// Top-level Engram configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngramConfig {
    /// Engine-level settings (logging, context window sizes).
    #[serde(default)]
    pub engine: EngineConfig,

    /// Ollama collaborator settings (generation and embedding endpoints).
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Document store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Episodic memory settings.
    #[serde(default)]
    pub episodic: EpisodicConfig,

    /// Summarization cadence and shape settings.
    #[serde(default)]
    pub summary: SummaryConfig,
}

/// Engine-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Number of recent messages in the short-term context window.
    #[serde(default = "default_short_term_window")]
    pub short_term_window: usize,

    /// Number of episodic matches retrieved per turn.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            short_term_window: default_short_term_window(),
            top_k: default_top_k(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_short_term_window() -> usize {
    8
}

fn default_top_k() -> usize {
    5
}

/// Ollama collaborator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for generation (replies, extraction, summarization).
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for embeddings.
    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embed_model: default_embed_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_chat_model() -> String {
    "phi3:mini".to_string()
}

fn default_embed_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("engram").join("engram.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("engram.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Episodic memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EpisodicConfig {
    /// Maximum facts extracted from one utterance.
    #[serde(default = "default_max_facts")]
    pub max_facts: usize,

    /// Maximum characters kept per fact.
    #[serde(default = "default_fact_max_chars")]
    pub fact_max_chars: usize,

    /// Importance assigned to a parsed fact line without a parsable score.
    #[serde(default = "default_default_importance")]
    pub default_importance: f64,

    /// Importance assigned to the single fallback fact when extraction
    /// fails entirely.
    #[serde(default = "default_fallback_importance")]
    pub fallback_importance: f64,

    /// Weight of cosine similarity in the blended retrieval score.
    #[serde(default = "default_similarity_weight")]
    pub similarity_weight: f64,

    /// Weight of stored importance in the blended retrieval score.
    #[serde(default = "default_importance_weight")]
    pub importance_weight: f64,

    /// Retrieval scans at most this many most-recent episodes per user.
    /// A deliberate recency-bounded approximation, not a full-corpus scan.
    #[serde(default = "default_candidate_scan_limit")]
    pub candidate_scan_limit: usize,
}

impl Default for EpisodicConfig {
    fn default() -> Self {
        Self {
            max_facts: default_max_facts(),
            fact_max_chars: default_fact_max_chars(),
            default_importance: default_default_importance(),
            fallback_importance: default_fallback_importance(),
            similarity_weight: default_similarity_weight(),
            importance_weight: default_importance_weight(),
            candidate_scan_limit: default_candidate_scan_limit(),
        }
    }
}

fn default_max_facts() -> usize {
    3
}

fn default_fact_max_chars() -> usize {
    800
}

fn default_default_importance() -> f64 {
    0.5
}

fn default_fallback_importance() -> f64 {
    0.3
}

fn default_similarity_weight() -> f64 {
    0.85
}

fn default_importance_weight() -> f64 {
    0.15
}

fn default_candidate_scan_limit() -> usize {
    300
}

/// Summarization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SummaryConfig {
    /// Regenerate the session summary every N user messages; the lifetime
    /// summary every 2*N. Zero disables summarization.
    #[serde(default = "default_session_interval")]
    pub session_interval: u64,

    /// Bullet count of a session summary.
    #[serde(default = "default_session_bullets")]
    pub session_bullets: usize,

    /// Bullet count of the lifetime summary.
    #[serde(default = "default_lifetime_bullets")]
    pub lifetime_bullets: usize,

    /// Maximum words per bullet.
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Minimum message window fed to session summarization (the effective
    /// window is max(engine.short_term_window, source_window)).
    #[serde(default = "default_source_window")]
    pub source_window: usize,

    /// How many recent session summaries the lifetime summary condenses.
    #[serde(default = "default_lifetime_span")]
    pub lifetime_span: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            session_interval: default_session_interval(),
            session_bullets: default_session_bullets(),
            lifetime_bullets: default_lifetime_bullets(),
            max_words: default_max_words(),
            source_window: default_source_window(),
            lifetime_span: default_lifetime_span(),
        }
    }
}

fn default_session_interval() -> u64 {
    4
}

fn default_session_bullets() -> usize {
    4
}

fn default_lifetime_bullets() -> usize {
    5
}

fn default_max_words() -> usize {
    16
}

fn default_source_window() -> usize {
    16
}

fn default_lifetime_span() -> usize {
    12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_contract() {
        let config = EngramConfig::default();
        assert_eq!(config.engine.short_term_window, 8);
        assert_eq!(config.engine.top_k, 5);
        assert_eq!(config.episodic.max_facts, 3);
        assert_eq!(config.episodic.fact_max_chars, 800);
        assert!((config.episodic.similarity_weight - 0.85).abs() < f64::EPSILON);
        assert!((config.episodic.importance_weight - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.episodic.candidate_scan_limit, 300);
        assert_eq!(config.summary.session_interval, 4);
        assert_eq!(config.summary.session_bullets, 4);
        assert_eq!(config.summary.lifetime_bullets, 5);
        assert_eq!(config.summary.max_words, 16);
        assert_eq!(config.summary.lifetime_span, 12);
    }

    #[test]
    fn deny_unknown_fields_rejects_typos() {
        let toml_str = r#"
[summary]
session_intervl = 6
"#;
        let result = toml::from_str::<EngramConfig>(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let toml_str = r#"
[summary]
session_interval = 6

[ollama]
chat_model = "llama3.2:3b"
"#;
        let config: EngramConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.summary.session_interval, 6);
        assert_eq!(config.summary.session_bullets, 4);
        assert_eq!(config.ollama.chat_model, "llama3.2:3b");
        assert_eq!(config.ollama.embed_model, "nomic-embed-text");
    }
}

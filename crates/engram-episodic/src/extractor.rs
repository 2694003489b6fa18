// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-based episodic fact extraction from single user utterances.
//!
//! The extractor asks the generation collaborator for up to three bullet
//! lines shaped `- <fact> (importance: 0.xx)` and parses them leniently.
//! It is a total function: on collaborator failure or fully unparsable
//! output it falls back to the truncated utterance at low importance,
//! so a non-empty utterance always yields at least one fact.

use std::sync::Arc;

use engram_config::EpisodicConfig;
use engram_core::types::truncate_chars;
use engram_core::{GenerationOptions, GenerationProvider};
use tracing::{debug, warn};

/// System prompt for episodic fact extraction.
const EXTRACTION_SYS: &str = "You are extracting personal facts and preferences from ONE user message. \
Return 0-3 bullets in the format: '- <fact> (importance: 0.xx)'. \
Focus on routines, goals, constraints, schedule, or environment. \
Keep each under 120 chars. No extra commentary.";

/// An extracted fact with its clamped importance weight.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFact {
    /// The fact text, truncated to the configured character limit.
    pub fact: String,
    /// Importance in [0, 1].
    pub importance: f64,
}

/// Extracts episodic facts from user utterances via the generation collaborator.
pub struct EpisodeExtractor {
    generation: Arc<dyn GenerationProvider>,
    config: EpisodicConfig,
}

impl EpisodeExtractor {
    /// Creates a new extractor.
    pub fn new(generation: Arc<dyn GenerationProvider>, config: EpisodicConfig) -> Self {
        Self { generation, config }
    }

    /// Extract up to `max_facts` facts from one utterance.
    ///
    /// Never fails: any collaborator error, and any output that parses to
    /// zero facts, yields the single fallback fact instead.
    pub async fn extract(&self, utterance: &str) -> Vec<ExtractedFact> {
        let user_prompt = format!("Message: {utterance}\nReturn 0-3 bullets.");
        let facts = match self
            .generation
            .complete(EXTRACTION_SYS, &user_prompt, &GenerationOptions::default())
            .await
        {
            Ok(content) => parse_fact_lines(&content, &self.config),
            Err(e) => {
                warn!(error = %e, "fact extraction call failed, using fallback");
                Vec::new()
            }
        };

        if facts.is_empty() {
            debug!("no facts parsed, falling back to truncated utterance");
            return vec![ExtractedFact {
                fact: truncate_chars(utterance, self.config.fact_max_chars),
                importance: self.config.fallback_importance,
            }];
        }
        facts
    }
}

/// Parse bullet lines of the shape `- <fact> (importance: 0.xx)`.
///
/// Grammar: leading/trailing spaces, `-`, and `*` are stripped from each
/// line; blank lines are skipped. When the literal token `importance:`
/// appears, the number before the next `)` is parsed and the parenthetical
/// is removed from the fact text; otherwise importance defaults to the
/// configured value. Scores are clamped to [0, 1] and facts truncated to
/// the configured character limit. At most `max_facts` entries.
pub fn parse_fact_lines(content: &str, config: &EpisodicConfig) -> Vec<ExtractedFact> {
    let mut facts = Vec::new();
    for raw in content.lines() {
        if facts.len() >= config.max_facts {
            break;
        }
        let line = raw.trim_matches(|c: char| c == ' ' || c == '-' || c == '*');
        if line.is_empty() {
            continue;
        }

        let mut fact = line.to_string();
        let mut score = config.default_importance;
        if let Some(idx) = line.find("importance:") {
            let after = &line[idx + "importance:".len()..];
            let num = after.split(')').next().unwrap_or("");
            if let Ok(parsed) = num.trim().parse::<f64>() {
                score = parsed;
                if let Some(open) = line.find("(importance:") {
                    fact = line[..open].trim().to_string();
                }
            }
        }

        facts.push(ExtractedFact {
            fact: truncate_chars(&fact, config.fact_max_chars),
            importance: score.clamp(0.0, 1.0),
        });
    }
    facts
}

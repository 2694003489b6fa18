// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly from the memory tiers.
//!
//! [`assemble_prompt`] lays out the context sections in a fixed order:
//! lifetime profile, recent session notes, short-term context, episodic
//! hints, the current user input, and a response-format directive. A
//! section whose source is absent or empty is omitted entirely; the
//! composer never renders an empty-labeled section. Assembly is pure
//! string work with no collaborator calls.

use engram_core::{EpisodicHit, Message};

/// System prompt for reply generation.
pub const REPLY_SYS: &str = "You are a helpful personal assistant. Practical, safe, non-clinical. \
Reply in 3-5 concise bullets (\u{2264}18 words each). \
Do NOT include the word 'importance' or any scores. \
Do NOT repeat or quote the user message. \
Never diagnose conditions or mention medications.";

/// Fixed response-format directive, always the final prompt section.
const DIRECTIVE: &str = "RESPOND WITH: 3-6 concise bullets or a 4-step plan.";

/// Assemble the ordered turn prompt from the memory tiers.
///
/// `short_term` is expected oldest-first; each message renders as a
/// role-prefixed line (`U:` / `A:`). Episodic hints are deduplicated
/// case-insensitively, stripped of leaked scoring text, and joined with
/// semicolons.
pub fn assemble_prompt(
    lifetime: Option<&str>,
    session: Option<&str>,
    short_term: &[Message],
    hints: &[EpisodicHit],
    current_input: &str,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(profile) = non_empty(lifetime) {
        parts.push(format!("LIFETIME PROFILE:\n{profile}"));
    }
    if let Some(notes) = non_empty(session) {
        parts.push(format!("RECENT SESSION NOTES:\n{notes}"));
    }
    if !short_term.is_empty() {
        let lines = short_term
            .iter()
            .map(|m| {
                let prefix = m
                    .role
                    .as_str()
                    .chars()
                    .next()
                    .map(|c| c.to_ascii_uppercase())
                    .unwrap_or('U');
                format!("{prefix}: {}", m.content)
            })
            .collect::<Vec<_>>()
            .join("\n");
        parts.push(format!("SHORT-TERM CONTEXT:\n{lines}"));
    }

    let episodic_line = join_hints(hints);
    if !episodic_line.is_empty() {
        parts.push(format!("EPISODIC HINTS: {episodic_line}"));
    }

    parts.push(format!("USER GOAL/QUESTION: {current_input}"));
    parts.push(DIRECTIVE.to_string());

    parts.join("\n\n")
}

/// Dedupe hint facts case-insensitively (keeping first occurrence, which
/// is the best-scored), strip leaked scoring text, and join with "; ".
fn join_hints(hints: &[EpisodicHit]) -> String {
    let mut seen = std::collections::HashSet::new();
    hints
        .iter()
        .filter(|h| seen.insert(h.fact.trim().to_lowercase()))
        .map(|h| clean_fact(&h.fact))
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Strip scoring text the extractor may have leaked into a stored fact.
fn clean_fact(fact: &str) -> String {
    fact.replace("importance:", "")
        .replace("( )", "")
        .trim()
        .to_string()
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_core::Role;

    fn msg(role: Role, content: &str) -> Message {
        Message {
            id: "m".to_string(),
            user_id: "u1".to_string(),
            session_id: "s1".to_string(),
            role,
            content: content.to_string(),
            created_at: "2026-03-01T00:00:00.000Z".to_string(),
        }
    }

    fn hit(fact: &str, score: f64) -> EpisodicHit {
        EpisodicHit {
            fact: fact.to_string(),
            importance: 0.5,
            score,
        }
    }

    #[test]
    fn full_prompt_has_fixed_section_order() {
        let short_term = vec![
            msg(Role::User, "I want to sleep better"),
            msg(Role::Assistant, "Try a fixed bedtime"),
        ];
        let hints = vec![hit("sleeps late on weekends", 0.9)];
        let prompt = assemble_prompt(
            Some("- Runs mornings"),
            Some("- Discussed sleep"),
            &short_term,
            &hints,
            "How do I wake up earlier?",
        );

        let lifetime_pos = prompt.find("LIFETIME PROFILE:").unwrap();
        let session_pos = prompt.find("RECENT SESSION NOTES:").unwrap();
        let short_pos = prompt.find("SHORT-TERM CONTEXT:").unwrap();
        let hints_pos = prompt.find("EPISODIC HINTS:").unwrap();
        let input_pos = prompt.find("USER GOAL/QUESTION:").unwrap();
        let directive_pos = prompt.find("RESPOND WITH:").unwrap();
        assert!(lifetime_pos < session_pos);
        assert!(session_pos < short_pos);
        assert!(short_pos < hints_pos);
        assert!(hints_pos < input_pos);
        assert!(input_pos < directive_pos);
    }

    #[test]
    fn short_term_lines_are_role_prefixed_oldest_first() {
        let short_term = vec![
            msg(Role::User, "first"),
            msg(Role::Assistant, "second"),
            msg(Role::User, "third"),
        ];
        let prompt = assemble_prompt(None, None, &short_term, &[], "now");
        assert!(prompt.contains("U: first\nA: second\nU: third"));
    }

    #[test]
    fn empty_sources_omit_sections_entirely() {
        let prompt = assemble_prompt(None, None, &[], &[], "hello");
        assert!(!prompt.contains("LIFETIME PROFILE"));
        assert!(!prompt.contains("RECENT SESSION NOTES"));
        assert!(!prompt.contains("SHORT-TERM CONTEXT"));
        assert!(!prompt.contains("EPISODIC HINTS"));
        assert!(prompt.contains("USER GOAL/QUESTION: hello"));
        assert!(prompt.ends_with("RESPOND WITH: 3-6 concise bullets or a 4-step plan."));
    }

    #[test]
    fn whitespace_only_summary_is_omitted() {
        let prompt = assemble_prompt(Some("   "), None, &[], &[], "hello");
        assert!(!prompt.contains("LIFETIME PROFILE"));
    }

    #[test]
    fn hints_are_deduped_and_semicolon_joined() {
        let hints = vec![
            hit("drinks tea daily", 0.9),
            hit("Drinks Tea Daily", 0.7),
            hit("runs at dawn", 0.6),
        ];
        let prompt = assemble_prompt(None, None, &[], &hints, "now");
        assert!(prompt.contains("EPISODIC HINTS: drinks tea daily; runs at dawn"));
    }

    #[test]
    fn leaked_scoring_text_is_stripped_from_hints() {
        let hints = vec![hit("lifts weights importance: 0.8", 0.9)];
        let prompt = assemble_prompt(None, None, &[], &hints, "now");
        assert!(prompt.contains("EPISODIC HINTS: lifts weights"));
        assert!(!prompt.contains("importance:"));
    }

    #[test]
    fn reply_system_prompt_bans_score_leakage() {
        assert!(REPLY_SYS.contains("importance"));
        assert!(REPLY_SYS.contains("Do NOT repeat"));
    }
}

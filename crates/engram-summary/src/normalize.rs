// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure text normalization for summary output.
//!
//! Whatever the generation collaborator returns, [`normalize_summary`]
//! forces it into exactly `n` bullet lines of at most `max_words` words,
//! each prefixed `"- "`. The accepted grammar:
//!
//! - bullet markers `- `, `* `, and the Unicode bullet are stripped;
//! - leading numbering (`1. `, `2) `) is stripped;
//! - a single-line response containing ` - ` separators is split on them;
//! - if nothing parses as a bullet, sentences are split on `.` only —
//!   never on `:`, which protects times like "7:30 AM";
//! - bullets are truncated at the first `.` or `;` sentence break,
//!   sanitized, word-truncated, and deduplicated case-insensitively;
//! - missing lines are padded with a fixed placeholder.
//!
//! No collaborator call happens here; the routine is deterministic.

use std::sync::LazyLock;

use regex::Regex;

/// Padding line used when the collaborator produced too few bullets.
const PADDING_BULLET: &str = "No further details provided";

static DISCLAIMER_PAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\([^)]*consider seeing a licensed professional[^)]*\)")
        .expect("valid regex")
});

static IMPORTANCE_PAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\([^)]*importance[^)]*\)").expect("valid regex")
});

static WHITESPACE_PAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static SENTENCE_BREAK_PAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.;]\s").expect("valid regex"));

/// Truncate a string to at most `n` whitespace-separated words.
fn truncate_words(s: &str, n: usize) -> String {
    s.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}

/// Extract candidate bullets from raw collaborator output.
///
/// Accepts typical bullet formats, strips numbering, and deduplicates
/// case-insensitively while preserving order.
fn extract_bullets(raw: &str) -> Vec<String> {
    let mut lines: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|ln| !ln.is_empty())
        .map(str::to_string)
        .collect();
    if lines.len() <= 1 && raw.contains(" - ") {
        lines = raw
            .split(" - ")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
    }

    let mut bullets = Vec::new();
    for line in &lines {
        let mut ln = line.as_str();
        if let Some(rest) = ln
            .strip_prefix("- ")
            .or_else(|| ln.strip_prefix("* "))
            .or_else(|| ln.strip_prefix("\u{2022} "))
        {
            ln = rest.trim();
        }
        // Strip leading numbering such as "1. " or "2) ".
        let cleaned = ln
            .trim_start_matches(|c: char| c.is_ascii_digit() || ".):- ".contains(c))
            .trim();
        if !cleaned.is_empty() {
            bullets.push(cleaned.to_string());
        }
    }

    // Paragraph fallback: split on periods only.
    if bullets.is_empty() {
        bullets = raw
            .replace('\n', " ")
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }

    let mut seen = std::collections::HashSet::new();
    bullets
        .into_iter()
        .filter(|b| seen.insert(b.to_lowercase()))
        .collect()
}

/// Remove disclaimers, leaked importance notes, and stray quotes, then
/// collapse whitespace. Numbers and times like "7:30 AM" survive intact.
fn sanitize_line(s: &str) -> String {
    let s = DISCLAIMER_PAT.replace_all(s, "");
    let s = IMPORTANCE_PAT.replace_all(&s, "");
    let s = s.replace(['\u{201c}', '\u{201d}', '"'], "");
    let s = WHITESPACE_PAT.replace_all(&s, " ");
    s.trim_matches(|c: char| " -;,:.\t".contains(c)).to_string()
}

/// Normalize raw collaborator output into exactly `n` bullet lines of at
/// most `max_words` words each, prefixed `"- "` and joined by newlines.
///
/// Padded lines carry the fixed placeholder verbatim, so the word limit
/// only holds for `max_words >= 4` (the placeholder's length); the line
/// count holds regardless. `n == 0` yields the empty string.
pub fn normalize_summary(raw: &str, n: usize, max_words: usize) -> String {
    let bullets = extract_bullets(raw);

    let mut cleaned = Vec::new();
    for bullet in &bullets {
        // Keep only the first sentence; split on period/semicolon so
        // clock times keep their colon.
        let first = SENTENCE_BREAK_PAT
            .splitn(bullet, 2)
            .next()
            .unwrap_or(bullet);
        let sanitized = sanitize_line(first);
        let truncated = truncate_words(&sanitized, max_words);
        if !truncated.is_empty() {
            cleaned.push(truncated);
        }
    }

    cleaned.truncate(n);
    while cleaned.len() < n {
        cleaned.push(PADDING_BULLET.to_string());
    }

    cleaned
        .iter()
        .map(|b| format!("- {b}"))
        .collect::<Vec<_>>()
        .join("\n")
}

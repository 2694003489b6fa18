// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Elm-style configuration diagnostics.
//!
//! Bridges `figment::Error` values into miette diagnostics. Unknown keys
//! get a source span into the offending TOML file, the list of keys their
//! section accepts, and a Jaro-Winkler "did you mean?" suggestion.
//!
//! The Engram config is deliberately flat: every key sits either at the
//! top level or directly under one `[section]` header, never deeper. The
//! span lookup leans on that.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity to offer a correction. 0.75 catches
/// typos like `top_kk` -> `top_k` and `session_intervl` ->
/// `session_interval` while filtering noise.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
///
/// Each variant carries what miette needs to render the report: spans,
/// suggestions, and the valid-key listing for the section.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(engram::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// Suggested correction via fuzzy matching, if any.
        suggestion: Option<String>,
        /// Comma-separated keys the section accepts.
        valid_keys: String,
        /// Source span for the offending key.
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        /// The source file content for context display.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(
        code(engram::config::invalid_type),
        help("expected {expected}")
    )]
    InvalidType {
        /// The key with the wrong type.
        key: String,
        /// Description of the type mismatch.
        detail: String,
        /// What type was expected.
        expected: String,
        /// Source span for the offending value.
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        /// The source file content.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(engram::config::missing_key),
        help("add `{key} = <value>` to your engram.toml")
    )]
    MissingKey {
        /// The missing key name.
        key: String,
    },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(engram::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(engram::config::other))]
    Other(String),
}

/// Format the help message for unknown key errors.
fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` (which may aggregate several failures) into
/// one `ConfigError` diagnostic per failure.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter().map(|e| classify(e, toml_sources)).collect()
}

/// Classify a single figment error into the matching diagnostic variant.
fn classify(error: figment::error::Error, toml_sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    // At most two levels deep: `path` holds the section name for keys
    // inside one, and is empty for top-level keys.
    let section = error.path.first().map(|p| p.to_string());

    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let suggestion = suggest_key(field, expected);
            let (span, src) = locate_key(&error, section.as_deref(), field, toml_sources);
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion,
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::InvalidType(actual, expected) => {
            let key = match &section {
                Some(s) if error.path.len() > 1 => format!("{s}.{}", error.path[1]),
                Some(s) => s.clone(),
                None => String::new(),
            };
            ConfigError::InvalidType {
                key,
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.to_string(),
                span: None,
                src: None,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: field.clone().into_owned(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Resolve the span of `key` in the TOML file the error originated from.
///
/// Returns nothing when the error came from the environment provider or
/// defaults rather than a file, or when the key cannot be found.
fn locate_key(
    error: &figment::error::Error,
    section: Option<&str>,
    key: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let path = match error.metadata.as_ref().and_then(|m| m.source.as_ref()) {
        Some(figment::Source::File(p)) => p.display().to_string(),
        _ => return (None, None),
    };
    let Some((_, content)) = toml_sources.iter().find(|(p, _)| p == &path) else {
        return (None, None);
    };

    match key_offset(content, section, key) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), key.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `key = ...` inside its `[section]`, or within the
/// top-level span when `section` is `None`.
///
/// The scan stops at the next header so a key repeated in a later section
/// is never misattributed.
fn key_offset(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut offset = 0;
    let mut in_section = section.is_none();

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            match section {
                Some(name) => {
                    if in_section {
                        return None; // ran past the section
                    }
                    in_section = trimmed.strip_prefix('[').is_some_and(|rest| {
                        rest.strip_prefix(name)
                            .is_some_and(|tail| tail.trim_end().starts_with(']'))
                    });
                }
                None => in_section = false,
            }
        } else if in_section
            && let Some(rest) = trimmed.strip_prefix(key)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len() + 1;
    }

    None
}

/// Suggest the closest valid key by Jaro-Winkler similarity, or `None`
/// when nothing clears the threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render a list of `ConfigError`s to stderr using miette's graphical
/// handler, falling back to plain Display if rendering fails.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_session_intervl_for_session_interval() {
        let valid = &["session_interval", "session_bullets", "max_words"];
        assert_eq!(
            suggest_key("session_intervl", valid),
            Some("session_interval".to_string())
        );
    }

    #[test]
    fn suggest_chat_modl_for_chat_model() {
        let valid = &["base_url", "chat_model", "embed_model", "timeout_secs"];
        assert_eq!(
            suggest_key("chat_modl", valid),
            Some("chat_model".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["top_k", "short_term_window", "log_level"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn key_offset_finds_key_in_its_section() {
        let content = "[summary]\nsession_intervl = 6\n";
        let o = key_offset(content, Some("summary"), "session_intervl").unwrap();
        assert_eq!(&content[o..o + 15], "session_intervl");
    }

    #[test]
    fn key_offset_stops_at_the_next_header() {
        let content = "[engine]\ntop_k = 5\n\n[episodic]\nmax_facts = 3\n";
        assert!(key_offset(content, Some("engine"), "max_facts").is_none());
        let o = key_offset(content, Some("episodic"), "max_facts").unwrap();
        assert_eq!(&content[o..o + 9], "max_facts");
    }

    #[test]
    fn key_offset_requires_an_assignment() {
        // A substring inside a value must not match.
        let content = "[engine]\nlog_level = \"top_k\"\ntop_k = 5\n";
        let o = key_offset(content, Some("engine"), "top_k").unwrap();
        assert_eq!(&content[o..], "top_k = 5\n");
    }

    #[test]
    fn key_offset_top_level_scan_ends_at_first_header() {
        let content = "stray = 1\n[engine]\nstray = 2\n";
        assert_eq!(key_offset(content, None, "stray"), Some(0));
    }
}

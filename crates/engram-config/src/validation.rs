// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths, positive window sizes, and
//! non-negative blend weights.

use crate::diagnostic::ConfigError;
use crate::model::EngramConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &EngramConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.engine.short_term_window == 0 {
        errors.push(ConfigError::Validation {
            message: "engine.short_term_window must be at least 1".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.ollama.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "ollama.base_url must not be empty".to_string(),
        });
    }

    if config.ollama.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "ollama.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.episodic.similarity_weight < 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "episodic.similarity_weight must be non-negative, got {}",
                config.episodic.similarity_weight
            ),
        });
    }

    if config.episodic.importance_weight < 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "episodic.importance_weight must be non-negative, got {}",
                config.episodic.importance_weight
            ),
        });
    }

    for (key, value) in [
        (
            "episodic.default_importance",
            config.episodic.default_importance,
        ),
        (
            "episodic.fallback_importance",
            config.episodic.fallback_importance,
        ),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be within [0.0, 1.0], got {value}"),
            });
        }
    }

    if config.episodic.fact_max_chars == 0 {
        errors.push(ConfigError::Validation {
            message: "episodic.fact_max_chars must be at least 1".to_string(),
        });
    }

    if config.episodic.candidate_scan_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "episodic.candidate_scan_limit must be at least 1".to_string(),
        });
    }

    if config.summary.session_bullets == 0 {
        errors.push(ConfigError::Validation {
            message: "summary.session_bullets must be at least 1".to_string(),
        });
    }

    if config.summary.lifetime_bullets == 0 {
        errors.push(ConfigError::Validation {
            message: "summary.lifetime_bullets must be at least 1".to_string(),
        });
    }

    if config.summary.max_words == 0 {
        errors.push(ConfigError::Validation {
            message: "summary.max_words must be at least 1".to_string(),
        });
    }

    if config.summary.lifetime_span == 0 {
        errors.push(ConfigError::Validation {
            message: "summary.lifetime_span must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

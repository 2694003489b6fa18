// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot command implementations: `turn`, `summarize`, and `memory`.
//!
//! Each builds the engine from configuration, runs one operation, and
//! prints the result to stdout, suitable for scripting against the engine.

use engram_config::EngramConfig;
use engram_core::{EngramError, TurnRequest};

use crate::shell::build_engine;

/// Runs one turn and prints the response as JSON on stdout.
pub async fn run_turn(
    config: EngramConfig,
    user_id: &str,
    session_id: Option<String>,
    message: String,
) -> Result<(), EngramError> {
    let engine = build_engine(&config).await?;

    let response = engine
        .turn(TurnRequest {
            user_id: user_id.to_string(),
            session_id,
            message,
        })
        .await?;

    let json = serde_json::to_string_pretty(&response)
        .map_err(|e| EngramError::Internal(format!("failed to serialize response: {e}")))?;
    println!("{json}");

    // A due summary is dispatched in the background; wait for it so it is
    // not cancelled when this process exits.
    engine.flush_summaries().await;
    Ok(())
}

/// Regenerates the session summary now, and optionally the lifetime one.
pub async fn run_summarize(
    config: EngramConfig,
    user_id: &str,
    session_id: &str,
    lifetime: bool,
) -> Result<(), EngramError> {
    let engine = build_engine(&config).await?;

    match engine.force_summarize(user_id, session_id).await? {
        Some(text) => println!("session summary:\n{text}"),
        None => println!("no messages to summarize"),
    }
    if lifetime {
        match engine.force_lifetime(user_id).await? {
            Some(text) => println!("\nlifetime summary:\n{text}"),
            None => println!("\nno session summaries to condense"),
        }
    }
    Ok(())
}

/// Prints a user's memory tiers as JSON.
pub async fn run_memory(
    config: EngramConfig,
    user_id: &str,
    session_id: &str,
) -> Result<(), EngramError> {
    let engine = build_engine(&config).await?;

    let snapshot = engine.memory_snapshot(user_id, session_id).await?;
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| EngramError::Internal(format!("failed to serialize snapshot: {e}")))?;
    println!("{json}");
    Ok(())
}

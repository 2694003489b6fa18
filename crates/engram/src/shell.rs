// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `engram shell` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline history.
//! Each line runs one conversational turn against the memory engine; the
//! reply prints to stdout. A fresh session key is generated per invocation
//! unless one is passed in.

use std::sync::Arc;

use colored::Colorize;
use engram_config::EngramConfig;
use engram_core::{EngramError, TurnRequest};
use engram_engine::MemoryEngine;
use engram_ollama::OllamaClient;
use engram_storage::{Database, SqliteStore};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;

/// Builds the engine from configuration: SQLite store plus an Ollama
/// client serving both generation and embedding.
pub async fn build_engine(config: &EngramConfig) -> Result<MemoryEngine, EngramError> {
    let db = Database::open(&config.storage).await?;
    let store = Arc::new(SqliteStore::new(db));
    let ollama = Arc::new(OllamaClient::new(&config.ollama)?);
    Ok(MemoryEngine::new(store, ollama.clone(), ollama, config))
}

/// Runs the `engram shell` interactive REPL.
pub async fn run_shell(
    config: EngramConfig,
    user_id: &str,
    session_id: Option<&str>,
) -> Result<(), EngramError> {
    let engine = build_engine(&config).await?;

    let session_id = session_id
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    info!(user_id, session_id = %session_id, "shell session started");

    let mut rl = DefaultEditor::new()
        .map_err(|e| EngramError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "engram shell".bold().green());
    println!("Type {} to exit.\n", "/quit".yellow());

    let prompt = format!("{}> ", "engram".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                let request = TurnRequest {
                    user_id: user_id.to_string(),
                    session_id: Some(session_id.clone()),
                    message: trimmed.to_string(),
                };
                match engine.turn(request).await {
                    Ok(response) => {
                        println!("{}\n", response.reply);
                    }
                    Err(e) => {
                        eprintln!("{}: {e}", "error".red());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

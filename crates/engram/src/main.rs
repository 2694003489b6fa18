// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engram - a hierarchical conversational memory engine.
//!
//! This is the binary entry point for the Engram CLI.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod shell;
mod turn;

use clap::{Parser, Subcommand};
use colored::Colorize;

/// Engram - a hierarchical conversational memory engine.
#[derive(Parser, Debug)]
#[command(name = "engram", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive REPL session.
    Shell {
        /// User whose memory tiers the session reads and writes.
        #[arg(long, default_value = "local")]
        user: String,
        /// Session key; a fresh one is generated when omitted.
        #[arg(long)]
        session: Option<String>,
    },
    /// Run a single conversational turn and print the response as JSON.
    Turn {
        /// User whose memory tiers the turn reads and writes.
        #[arg(long, default_value = "local")]
        user: String,
        /// Session key; defaults to "default".
        #[arg(long)]
        session: Option<String>,
        /// The user message for this turn.
        message: String,
    },
    /// Regenerate summaries now, off the usual cadence.
    Summarize {
        /// User whose summaries to regenerate.
        #[arg(long, default_value = "local")]
        user: String,
        /// Session key; defaults to "default".
        #[arg(long, default_value = "default")]
        session: String,
        /// Also refresh the lifetime summary.
        #[arg(long)]
        lifetime: bool,
    },
    /// Print a user's memory tiers as JSON.
    Memory {
        /// User whose memory to inspect.
        #[arg(long, default_value = "local")]
        user: String,
        /// Session key; defaults to "default".
        #[arg(long, default_value = "default")]
        session: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match engram_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            engram_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.engine.log_level);

    let result = match cli.command {
        Some(Commands::Shell { user, session }) => {
            shell::run_shell(config, &user, session.as_deref()).await
        }
        Some(Commands::Turn {
            user,
            session,
            message,
        }) => turn::run_turn(config, &user, session, message).await,
        Some(Commands::Summarize {
            user,
            session,
            lifetime,
        }) => turn::run_summarize(config, &user, &session, lifetime).await,
        Some(Commands::Memory { user, session }) => {
            turn::run_memory(config, &user, &session).await
        }
        None => {
            println!("engram: use --help for available commands");
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("engram={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management and schema application.

use std::path::Path;

use engram_core::EngramError;
use tokio_rusqlite::Connection;
use tracing::debug;

use engram_config::StorageConfig;

/// Embedded schema, applied idempotently on every open.
///
/// Three append-only collections. Messages and episodes are never updated
/// in place; the single lifetime summary row per user is replaced whole.
/// Every recency query orders by `(created_at, rowid)` so same-millisecond
/// inserts keep a stable order.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL,
    session_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_scope
    ON messages(user_id, session_id, created_at);

CREATE TABLE IF NOT EXISTS summaries (
    id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL,
    session_id TEXT,
    scope TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_summaries_scope
    ON summaries(user_id, scope, created_at);

CREATE TABLE IF NOT EXISTS episodes (
    id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL,
    session_id TEXT NOT NULL,
    fact TEXT NOT NULL,
    importance REAL NOT NULL,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_episodes_user
    ON episodes(user_id, created_at);
";

/// Map a tokio_rusqlite error to the fatal store error variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> EngramError {
    EngramError::Store {
        source: Box::new(e),
    }
}

/// Map a plain rusqlite error to the same variant; `Connection::open`
/// returns these directly, before the worker thread is involved.
fn map_sq_err(e: rusqlite::Error) -> EngramError {
    EngramError::Store {
        source: Box::new(e),
    }
}

/// A handle to the SQLite database backing the document store.
///
/// `tokio_rusqlite::Connection` serializes all access through a dedicated
/// worker thread, so concurrent turns can share one clone-able handle
/// without cross-row locking concerns.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at the configured path and apply the
    /// schema. Creates parent directories as needed.
    pub async fn open(config: &StorageConfig) -> Result<Self, EngramError> {
        let path = Path::new(&config.database_path);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| EngramError::Store {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path).await.map_err(map_sq_err)?;
        let wal_mode = config.wal_mode;
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path = %config.database_path, wal = wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database with the schema applied. Used by tests
    /// across the workspace.
    pub async fn open_in_memory() -> Result<Self, EngramError> {
        let conn = Connection::open_in_memory().await.map_err(map_sq_err)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        Ok(Self { conn })
    }

    /// Access the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

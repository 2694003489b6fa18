// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `DocumentStore` trait.

use async_trait::async_trait;
use rusqlite::OptionalExtension;

use engram_core::{
    DocumentStore, EngramError, Episode, Message, Role, Summary, SummaryScope,
};

use crate::database::{map_tr_err, Database};

/// Serialize an embedding vector to little-endian f32 bytes for BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        blob.extend_from_slice(&v.to_le_bytes());
    }
    blob
}

/// Deserialize little-endian f32 bytes back to an embedding vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// SQLite-backed document store.
///
/// All queries order by `(created_at, rowid)`; timestamps have millisecond
/// precision and the rowid tie-break keeps same-millisecond inserts in
/// arrival order.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Create a store over an opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn append_message(&self, message: &Message) -> Result<(), EngramError> {
        let m = message.clone();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO messages (id, user_id, session_id, role, content, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![
                        m.id,
                        m.user_id,
                        m.session_id,
                        m.role.as_str(),
                        m.content,
                        m.created_at
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn recent_messages(
        &self,
        user_id: &str,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, EngramError> {
        let user_id = user_id.to_string();
        let session_id = session_id.to_string();
        let mut messages: Vec<Message> = self
            .db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, session_id, role, content, created_at
                     FROM messages
                     WHERE user_id = ?1 AND session_id = ?2
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?3",
                )?;
                let rows = stmt
                    .query_map(
                        rusqlite::params![user_id, session_id, limit as i64],
                        |row| {
                            let role: String = row.get(3)?;
                            Ok(Message {
                                id: row.get(0)?,
                                user_id: row.get(1)?,
                                session_id: row.get(2)?,
                                role: Role::from_str_value(&role),
                                content: row.get(4)?,
                                created_at: row.get(5)?,
                            })
                        },
                    )?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)?;
        // Scanned newest-first for the LIMIT; callers want oldest-first.
        messages.reverse();
        Ok(messages)
    }

    async fn count_messages(
        &self,
        user_id: &str,
        session_id: &str,
        role: Role,
    ) -> Result<u64, EngramError> {
        let user_id = user_id.to_string();
        let session_id = session_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM messages
                     WHERE user_id = ?1 AND session_id = ?2 AND role = ?3",
                    rusqlite::params![user_id, session_id, role.as_str()],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn insert_summary(&self, summary: &Summary) -> Result<(), EngramError> {
        let s = summary.clone();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO summaries (id, user_id, session_id, scope, body, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![
                        s.id,
                        s.user_id,
                        s.session_id,
                        s.scope.as_str(),
                        s.text,
                        s.created_at
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn replace_lifetime_summary(&self, summary: &Summary) -> Result<(), EngramError> {
        let s = summary.clone();
        self.db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "DELETE FROM summaries WHERE user_id = ?1 AND scope = 'lifetime'",
                    rusqlite::params![s.user_id],
                )?;
                tx.execute(
                    "INSERT INTO summaries (id, user_id, session_id, scope, body, created_at)
                     VALUES (?1, ?2, NULL, 'lifetime', ?3, ?4)",
                    rusqlite::params![s.id, s.user_id, s.text, s.created_at],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn latest_summary(
        &self,
        user_id: &str,
        scope: SummaryScope,
        session_id: Option<&str>,
    ) -> Result<Option<Summary>, EngramError> {
        let user_id = user_id.to_string();
        let session_id = session_id.map(str::to_string);
        if scope == SummaryScope::Session && session_id.is_none() {
            return Ok(None);
        }
        self.db
            .connection()
            .call(move |conn| {
                let (sql, params): (&str, Vec<Box<dyn rusqlite::types::ToSql>>) = match scope {
                    SummaryScope::Session => (
                        "SELECT id, user_id, session_id, scope, body, created_at
                         FROM summaries
                         WHERE user_id = ?1 AND scope = 'session' AND session_id = ?2
                         ORDER BY created_at DESC, rowid DESC
                         LIMIT 1",
                        vec![
                            Box::new(user_id),
                            Box::new(session_id),
                        ],
                    ),
                    SummaryScope::Lifetime => (
                        "SELECT id, user_id, session_id, scope, body, created_at
                         FROM summaries
                         WHERE user_id = ?1 AND scope = 'lifetime'
                         ORDER BY created_at DESC, rowid DESC
                         LIMIT 1",
                        vec![Box::new(user_id)],
                    ),
                };
                let mut stmt = conn.prepare(sql)?;
                let param_refs: Vec<&dyn rusqlite::types::ToSql> =
                    params.iter().map(|p| p.as_ref()).collect();
                let summary = stmt
                    .query_row(param_refs.as_slice(), row_to_summary)
                    .optional()?;
                Ok(summary)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn recent_session_summaries(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Summary>, EngramError> {
        let user_id = user_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, session_id, scope, body, created_at
                     FROM summaries
                     WHERE user_id = ?1 AND scope = 'session'
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?2",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![user_id, limit as i64], row_to_summary)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn insert_episode(&self, episode: &Episode) -> Result<(), EngramError> {
        let e = episode.clone();
        let blob = vec_to_blob(&e.embedding);
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO episodes (id, user_id, session_id, fact, importance, embedding, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    rusqlite::params![
                        e.id,
                        e.user_id,
                        e.session_id,
                        e.fact,
                        e.importance,
                        blob,
                        e.created_at
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn recent_episodes(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Episode>, EngramError> {
        let user_id = user_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, session_id, fact, importance, embedding, created_at
                     FROM episodes
                     WHERE user_id = ?1
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?2",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![user_id, limit as i64], |row| {
                        let blob: Vec<u8> = row.get(5)?;
                        Ok(Episode {
                            id: row.get(0)?,
                            user_id: row.get(1)?,
                            session_id: row.get(2)?,
                            fact: row.get(3)?,
                            importance: row.get(4)?,
                            embedding: blob_to_vec(&blob),
                            created_at: row.get(6)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Convert a rusqlite Row to a Summary struct.
fn row_to_summary(row: &rusqlite::Row) -> Result<Summary, rusqlite::Error> {
    let scope: String = row.get(3)?;
    Ok(Summary {
        id: row.get(0)?,
        user_id: row.get(1)?,
        session_id: row.get(2)?,
        scope: SummaryScope::from_str_value(&scope),
        text: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_core::types::iso_timestamp;

    async fn setup_store() -> SqliteStore {
        let db = Database::open_in_memory().await.unwrap();
        SqliteStore::new(db)
    }

    fn make_message(id: &str, role: Role, content: &str, created_at: &str) -> Message {
        Message {
            id: id.to_string(),
            user_id: "u1".to_string(),
            session_id: "s1".to_string(),
            role,
            content: content.to_string(),
            created_at: created_at.to_string(),
        }
    }

    fn make_episode(id: &str, fact: &str, importance: f64, embedding: Vec<f32>) -> Episode {
        Episode {
            id: id.to_string(),
            user_id: "u1".to_string(),
            session_id: "s1".to_string(),
            fact: fact.to_string(),
            importance,
            embedding,
            created_at: iso_timestamp(),
        }
    }

    #[tokio::test]
    async fn recent_messages_oldest_first_with_limit() {
        let store = setup_store().await;
        for i in 0..5 {
            let msg = make_message(
                &format!("m{i}"),
                if i % 2 == 0 { Role::User } else { Role::Assistant },
                &format!("message {i}"),
                &format!("2026-03-01T00:00:0{i}.000Z"),
            );
            store.append_message(&msg).await.unwrap();
        }

        let recent = store.recent_messages("u1", "s1", 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "message 2");
        assert_eq!(recent[2].content, "message 4");
    }

    #[tokio::test]
    async fn same_timestamp_keeps_arrival_order() {
        let store = setup_store().await;
        let ts = "2026-03-01T00:00:00.000Z";
        for i in 0..3 {
            let msg = make_message(&format!("m{i}"), Role::User, &format!("burst {i}"), ts);
            store.append_message(&msg).await.unwrap();
        }

        let recent = store.recent_messages("u1", "s1", 10).await.unwrap();
        assert_eq!(recent[0].content, "burst 0");
        assert_eq!(recent[2].content, "burst 2");
    }

    #[tokio::test]
    async fn count_messages_filters_by_role() {
        let store = setup_store().await;
        for i in 0..4 {
            let role = if i < 3 { Role::User } else { Role::Assistant };
            let msg = make_message(
                &format!("m{i}"),
                role,
                "x",
                &format!("2026-03-01T00:00:0{i}.000Z"),
            );
            store.append_message(&msg).await.unwrap();
        }

        assert_eq!(store.count_messages("u1", "s1", Role::User).await.unwrap(), 3);
        assert_eq!(
            store.count_messages("u1", "s1", Role::Assistant).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = setup_store().await;
        let mut a = make_message("m1", Role::User, "in s1", "2026-03-01T00:00:00.000Z");
        store.append_message(&a).await.unwrap();
        a.id = "m2".to_string();
        a.session_id = "s2".to_string();
        a.content = "in s2".to_string();
        store.append_message(&a).await.unwrap();

        let s1 = store.recent_messages("u1", "s1", 10).await.unwrap();
        assert_eq!(s1.len(), 1);
        assert_eq!(s1[0].content, "in s1");
    }

    #[tokio::test]
    async fn session_summaries_are_insert_only_latest_wins() {
        let store = setup_store().await;
        for i in 0..3 {
            let summary = Summary {
                id: format!("sum{i}"),
                user_id: "u1".to_string(),
                session_id: Some("s1".to_string()),
                scope: SummaryScope::Session,
                text: format!("- version {i}"),
                created_at: format!("2026-03-01T00:00:0{i}.000Z"),
            };
            store.insert_summary(&summary).await.unwrap();
        }

        let latest = store
            .latest_summary("u1", SummaryScope::Session, Some("s1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.text, "- version 2");

        let all = store.recent_session_summaries("u1", 10).await.unwrap();
        assert_eq!(all.len(), 3, "older session summaries are retained");
        assert_eq!(all[0].text, "- version 2", "newest first");
    }

    #[tokio::test]
    async fn lifetime_summary_is_replaced_whole() {
        let store = setup_store().await;
        for i in 0..2 {
            let summary = Summary {
                id: format!("life{i}"),
                user_id: "u1".to_string(),
                session_id: None,
                scope: SummaryScope::Lifetime,
                text: format!("- lifetime {i}"),
                created_at: format!("2026-03-01T00:00:0{i}.000Z"),
            };
            store.replace_lifetime_summary(&summary).await.unwrap();
        }

        let latest = store
            .latest_summary("u1", SummaryScope::Lifetime, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.text, "- lifetime 1");

        // The replace leaves exactly one lifetime row.
        let db = store.db.clone();
        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM summaries WHERE scope = 'lifetime'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn latest_session_summary_without_session_id_is_none() {
        let store = setup_store().await;
        let result = store
            .latest_summary("u1", SummaryScope::Session, None)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn episode_embedding_blob_roundtrip() {
        let store = setup_store().await;
        let embedding: Vec<f32> = (0..384).map(|i| i as f32 / 384.0).collect();
        let episode = make_episode("e1", "runs every morning", 0.8, embedding.clone());
        store.insert_episode(&episode).await.unwrap();

        let episodes = store.recent_episodes("u1", 10).await.unwrap();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].embedding.len(), 384);
        for (a, b) in embedding.iter().zip(episodes[0].embedding.iter()) {
            assert!((a - b).abs() < f32::EPSILON);
        }
    }

    #[tokio::test]
    async fn empty_embedding_persists_as_sentinel() {
        let store = setup_store().await;
        let episode = make_episode("e1", "opaque fact", 0.3, vec![]);
        store.insert_episode(&episode).await.unwrap();

        let episodes = store.recent_episodes("u1", 10).await.unwrap();
        assert_eq!(episodes.len(), 1);
        assert!(episodes[0].embedding.is_empty());
    }

    #[tokio::test]
    async fn recent_episodes_respects_scan_limit() {
        let store = setup_store().await;
        for i in 0..10 {
            let mut episode = make_episode(&format!("e{i}"), &format!("fact {i}"), 0.5, vec![]);
            episode.created_at = format!("2026-03-01T00:00:{i:02}.000Z");
            store.insert_episode(&episode).await.unwrap();
        }

        let episodes = store.recent_episodes("u1", 4).await.unwrap();
        assert_eq!(episodes.len(), 4);
        assert_eq!(episodes[0].fact, "fact 9", "newest first");
        assert_eq!(episodes[3].fact, "fact 6");
    }

    #[test]
    fn blob_roundtrip_preserves_values() {
        let original = vec![0.0f32, -1.5, 3.25, f32::MAX];
        let blob = vec_to_blob(&original);
        assert_eq!(blob.len(), 16);
        assert_eq!(blob_to_vec(&blob), original);
    }
}

// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed document store for the Engram memory engine.
//!
//! Provides the [`SqliteStore`] implementation of `engram_core::DocumentStore`
//! over a single serialized connection (tokio-rusqlite). Embeddings are stored
//! as little-endian f32 BLOBs alongside their episodes.

pub mod database;
pub mod store;

pub use database::Database;
pub use store::{blob_to_vec, vec_to_blob, SqliteStore};

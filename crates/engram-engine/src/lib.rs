// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn orchestration for the Engram memory engine.
//!
//! [`MemoryEngine::turn`] drives one conversational turn: append the user
//! message, extract and store episodic facts, gather the short-term window
//! and summaries, compose the prompt, generate the reply, append it, and
//! dispatch summarization as a detached background task so reply latency
//! never depends on it.

pub mod engine;

pub use engine::MemoryEngine;

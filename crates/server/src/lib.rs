//! Steward server — the HTTP face of the chat assistant.
//!
//! One endpoint does the work: `POST /v1/chat` takes the full message history
//! and answers with an SSE stream of text deltas, tool-call framing, and a
//! terminal `done` or `error` event. Nothing persists between requests.

pub mod chat;
pub mod config;
mod error;

pub use chat::app;
pub use error::{Error, Result};

//! LLM backend implementations.
//!
//! The [`crate::model::Backend`] trait abstracts the provider; this module
//! holds the concrete Anthropic Messages API backend.

mod anthropic;

pub use anthropic::{AnthropicBackend, AnthropicBackendBuilder, DEFAULT_MODEL};

//! Steward runtime — conversation orchestration over a streaming LLM backend.
//!
//! The runtime is organized around these concepts:
//!
//! - **Agent**: drives one conversation turn through a bounded model/tool
//!   loop, emitting incremental [`AgentEvent`]s while it runs.
//! - **Backend**: a trait abstracting the model provider;
//!   [`AnthropicBackend`] streams from the Anthropic Messages API.
//! - **ToolHost**: the seam between the model loop and side effects, with
//!   [`RegistryHost`] adapting the built-in tool registry.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{Agent, AnthropicBackend, EventSink, Message, RegistryHost};
//! use tools::{ForecastClient, PythonRunner, Registry};
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = AnthropicBackend::builder("sk-ant-api01-...", "claude-sonnet-4-20250514")
//!     .system("You are a helpful assistant.")
//!     .build();
//! let host = RegistryHost::new(Registry::builtin(
//!     ForecastClient::new(),
//!     PythonRunner::new(),
//! ));
//!
//! let agent = Agent::new(backend, host);
//! let (sink, mut events) = EventSink::channel();
//! let outcome = agent.run(vec![Message::user("Weather in Tokyo?")], &sink).await?;
//! # Ok(())
//! # }
//! ```

mod agent;
mod backend;
mod error;
mod event;
mod host;
pub mod model;

pub use agent::{Agent, MAX_STEPS, TurnOutcome};
pub use backend::{AnthropicBackend, AnthropicBackendBuilder, DEFAULT_MODEL};
pub use error::{Error, Result};
pub use event::{AgentEvent, EventSink};
pub use host::{EmptyToolHost, RegistryHost, ToolHost};
pub use model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, StopReason, ToolCall,
    ToolResult, ToolSpec, Usage,
};

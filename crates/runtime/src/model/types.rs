use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tools::ToolError;

use super::errors::ModelError;
use crate::event::EventSink;

/// Role of a message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (used to correlate results).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments as JSON.
    pub input: Value,
}

/// The result returned to the model after a tool call.
///
/// A success payload or an error descriptor, never both. The error side is
/// ordinary data for the model to reason about, not a fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResult {
    Success {
        tool_call_id: String,
        output: Value,
    },
    Failure {
        tool_call_id: String,
        error: ToolError,
    },
}

impl ToolResult {
    /// ID of the call this result answers.
    pub fn tool_call_id(&self) -> &str {
        match self {
            Self::Success { tool_call_id, .. } | Self::Failure { tool_call_id, .. } => tool_call_id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

/// A part of a message's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    /// Plain text content.
    Text { text: String },
    /// Tool call from the assistant.
    ToolCall(ToolCall),
    /// Tool result fed back as user content.
    ToolResult(ToolResult),
}

impl Part {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    /// Create a message with a role and text content.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::text(text)],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    /// Create a user message carrying tool results.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            parts: results.into_iter().map(Part::ToolResult).collect(),
        }
    }

    /// Get combined text content from all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Extract all tool calls from this message.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::ToolCall(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }
}

/// A tool definition exposed to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for input parameters.
    pub input_schema: Value,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response.
    EndTurn,
    /// Model wants to call tools.
    ToolUse,
    /// Hit the token limit.
    MaxTokens,
    /// The orchestrator's step bound was reached.
    StepLimit,
    /// Anything else (forward compatibility).
    Other(String),
}

impl StopReason {
    pub fn from_api(reason: &str) -> Self {
        match reason {
            "end_turn" => Self::EndTurn,
            "tool_use" => Self::ToolUse,
            "max_tokens" => Self::MaxTokens,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    /// Accumulate another step's usage.
    pub fn add(&mut self, other: Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// Everything needed for one model request.
#[derive(Debug, Clone)]
pub struct ModelRequest<'a> {
    pub messages: &'a [Message],
    pub tools: &'a [ToolSpec],
}

/// The response from a model.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: Usage,
}

/// Trait for LLM provider backends.
///
/// Implementations emit text deltas through the sink as they arrive and
/// resolve with the fully assembled assistant message.
pub trait Backend: Send + Sync {
    fn stream(
        &self,
        request: ModelRequest<'_>,
        sink: &EventSink,
    ) -> impl Future<Output = Result<ModelResponse, ModelError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_text_extraction() {
        let msg = Message {
            role: Role::Assistant,
            parts: vec![
                Part::text("Hello "),
                Part::ToolCall(ToolCall {
                    id: "1".into(),
                    name: "test".into(),
                    input: Value::Null,
                }),
                Part::text("world"),
            ],
        };
        assert_eq!(msg.text(), "Hello world");
    }

    #[test]
    fn message_tool_calls_extraction() {
        let msg = Message {
            role: Role::Assistant,
            parts: vec![
                Part::text("Let me check"),
                Part::ToolCall(ToolCall {
                    id: "1".into(),
                    name: "get_weather".into(),
                    input: Value::Null,
                }),
                Part::ToolCall(ToolCall {
                    id: "2".into(),
                    name: "run_python".into(),
                    input: Value::Null,
                }),
            ],
        };
        let calls = msg.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "get_weather");
        assert_eq!(calls[1].name, "run_python");
    }

    #[test]
    fn tool_result_is_success_xor_failure() {
        let success = ToolResult::Success {
            tool_call_id: "a".into(),
            output: Value::String("ok".into()),
        };
        assert!(!success.is_error());
        assert_eq!(success.tool_call_id(), "a");

        let failure = ToolResult::Failure {
            tool_call_id: "b".into(),
            error: tools::ToolError::NotFound("x".into()),
        };
        assert!(failure.is_error());
        assert_eq!(failure.tool_call_id(), "b");
    }

    #[test]
    fn stop_reason_from_api_strings() {
        assert_eq!(StopReason::from_api("end_turn"), StopReason::EndTurn);
        assert_eq!(StopReason::from_api("tool_use"), StopReason::ToolUse);
        assert_eq!(
            StopReason::from_api("stop_sequence"),
            StopReason::Other("stop_sequence".into())
        );
    }

    #[test]
    fn usage_accumulates() {
        let mut total = Usage::default();
        total.add(Usage {
            input_tokens: 10,
            output_tokens: 5,
        });
        total.add(Usage {
            input_tokens: 20,
            output_tokens: 7,
        });
        assert_eq!(total.input_tokens, 30);
        assert_eq!(total.output_tokens, 12);
    }
}

//! Anthropic Messages API backend (streaming).

use std::collections::BTreeMap;

use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::{AgentEvent, EventSink};
use crate::model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, StopReason, ToolCall,
    ToolResult, ToolSpec, Usage,
};
use crate::{Error, Result};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_MAX_TOKENS: u32 = 4096;

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types (requests)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    stream: bool,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: ApiContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiContent {
    Text(String),
    Blocks(Vec<ApiContentBlock>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

#[derive(Debug, Serialize)]
struct ApiTool {
    name: String,
    description: String,
    input_schema: Value,
}

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types (stream events)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiStreamEvent {
    MessageStart {
        message: ApiMessageStart,
    },
    ContentBlockStart {
        index: usize,
        content_block: ApiBlockStart,
    },
    ContentBlockDelta {
        index: usize,
        delta: ApiBlockDelta,
    },
    ContentBlockStop {
        #[allow(dead_code)]
        index: usize,
    },
    MessageDelta {
        delta: ApiMessageDelta,
        #[serde(default)]
        usage: Option<ApiUsage>,
    },
    MessageStop,
    Ping,
    Error {
        error: ApiErrorBody,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct ApiMessageStart {
    #[serde(default)]
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiBlockStart {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiBlockDelta {
    TextDelta { text: String },
    InputJsonDelta { partial_json: String },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct ApiMessageDelta {
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type", default)]
    kind: String,
    message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Stream assembly
// ─────────────────────────────────────────────────────────────────────────────

/// One content block under construction, keyed by stream index.
#[derive(Debug)]
enum PendingBlock {
    Text(String),
    ToolUse {
        id: String,
        name: String,
        input_json: String,
    },
}

/// Accumulates stream events into the final assistant message.
///
/// Text deltas are surfaced as they arrive; tool-use input JSON arrives as
/// partial fragments and only parses once the whole message is assembled.
#[derive(Debug, Default)]
struct MessageAssembler {
    blocks: BTreeMap<usize, PendingBlock>,
    stop_reason: Option<StopReason>,
    usage: Usage,
}

impl MessageAssembler {
    /// Apply one event; returns any text fragment to surface immediately.
    fn apply(&mut self, event: ApiStreamEvent) -> std::result::Result<Option<String>, ModelError> {
        match event {
            ApiStreamEvent::MessageStart { message } => {
                self.usage.input_tokens = message.usage.input_tokens;
                self.usage.output_tokens = message.usage.output_tokens;
                Ok(None)
            }
            ApiStreamEvent::ContentBlockStart {
                index,
                content_block,
            } => {
                match content_block {
                    ApiBlockStart::Text { text } => {
                        self.blocks.insert(index, PendingBlock::Text(text));
                    }
                    ApiBlockStart::ToolUse { id, name } => {
                        self.blocks.insert(
                            index,
                            PendingBlock::ToolUse {
                                id,
                                name,
                                input_json: String::new(),
                            },
                        );
                    }
                    ApiBlockStart::Unknown => {}
                }
                Ok(None)
            }
            ApiStreamEvent::ContentBlockDelta { index, delta } => {
                match (self.blocks.get_mut(&index), delta) {
                    (Some(PendingBlock::Text(text)), ApiBlockDelta::TextDelta { text: t }) => {
                        text.push_str(&t);
                        Ok(Some(t))
                    }
                    (
                        Some(PendingBlock::ToolUse { input_json, .. }),
                        ApiBlockDelta::InputJsonDelta { partial_json },
                    ) => {
                        input_json.push_str(&partial_json);
                        Ok(None)
                    }
                    (_, ApiBlockDelta::Unknown) => Ok(None),
                    _ => Err(ModelError::InvalidResponse(format!(
                        "delta for unexpected block index {index}"
                    ))),
                }
            }
            ApiStreamEvent::MessageDelta { delta, usage } => {
                if let Some(reason) = delta.stop_reason {
                    self.stop_reason = Some(StopReason::from_api(&reason));
                }
                if let Some(usage) = usage {
                    self.usage.output_tokens = usage.output_tokens;
                    if usage.input_tokens > 0 {
                        self.usage.input_tokens = usage.input_tokens;
                    }
                }
                Ok(None)
            }
            ApiStreamEvent::Error { error } => Err(ModelError::Api(format!(
                "{}: {}",
                error.kind, error.message
            ))),
            ApiStreamEvent::ContentBlockStop { .. }
            | ApiStreamEvent::MessageStop
            | ApiStreamEvent::Ping
            | ApiStreamEvent::Unknown => Ok(None),
        }
    }

    fn finish(self) -> std::result::Result<ModelResponse, ModelError> {
        let mut parts = Vec::new();
        for (_, block) in self.blocks {
            match block {
                PendingBlock::Text(text) => {
                    if !text.is_empty() {
                        parts.push(Part::Text { text });
                    }
                }
                PendingBlock::ToolUse {
                    id,
                    name,
                    input_json,
                } => {
                    let input: Value = if input_json.is_empty() {
                        Value::Object(Default::default())
                    } else {
                        serde_json::from_str(&input_json).map_err(|e| {
                            ModelError::InvalidResponse(format!("tool input for {name}: {e}"))
                        })?
                    };
                    parts.push(Part::ToolCall(ToolCall { id, name, input }));
                }
            }
        }

        Ok(ModelResponse {
            message: Message {
                role: Role::Assistant,
                parts,
            },
            stop_reason: self.stop_reason.unwrap_or(StopReason::EndTurn),
            usage: self.usage,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating an Anthropic backend.
#[derive(Debug, Clone)]
pub struct AnthropicBackendBuilder {
    api_key: String,
    model: String,
    max_tokens: u32,
    system: Option<String>,
    base_url: String,
}

impl AnthropicBackendBuilder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            system: None,
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn build(self) -> AnthropicBackend {
        AnthropicBackend {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            model: self.model,
            max_tokens: self.max_tokens,
            system: self.system,
            base_url: self.base_url,
        }
    }
}

/// Anthropic Messages API backend.
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    system: Option<String>,
    base_url: String,
}

impl AnthropicBackend {
    pub fn builder(
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> AnthropicBackendBuilder {
        AnthropicBackendBuilder::new(api_key, model)
    }

    /// Build from the ANTHROPIC_API_KEY environment variable.
    pub fn from_env(model: impl Into<String>) -> Result<AnthropicBackendBuilder> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| Error::Config("ANTHROPIC_API_KEY not set".into()))?;
        Ok(AnthropicBackendBuilder::new(api_key, model))
    }

    fn role_to_api(role: Role) -> &'static str {
        match role {
            Role::User | Role::System => "user",
            Role::Assistant => "assistant",
        }
    }

    fn message_to_api(msg: &Message) -> ApiMessage {
        let role = Self::role_to_api(msg.role);

        // Simple case: single text part
        if msg.parts.len() == 1 {
            if let Part::Text { text } = &msg.parts[0] {
                return ApiMessage {
                    role,
                    content: ApiContent::Text(text.clone()),
                };
            }
        }

        // Complex case: multiple parts or non-text
        let blocks: Vec<ApiContentBlock> = msg
            .parts
            .iter()
            .map(|part| match part {
                Part::Text { text } => ApiContentBlock::Text { text: text.clone() },
                Part::ToolCall(call) => ApiContentBlock::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: call.input.clone(),
                },
                Part::ToolResult(result) => {
                    let (tool_use_id, content, is_error) = match result {
                        ToolResult::Success {
                            tool_call_id,
                            output,
                        } => (tool_call_id.clone(), output.to_string(), false),
                        ToolResult::Failure {
                            tool_call_id,
                            error,
                        } => (tool_call_id.clone(), error.to_string(), true),
                    };
                    ApiContentBlock::ToolResult {
                        tool_use_id,
                        content,
                        is_error,
                    }
                }
            })
            .collect();

        ApiMessage {
            role,
            content: ApiContent::Blocks(blocks),
        }
    }

    fn tool_to_api(spec: &ToolSpec) -> ApiTool {
        ApiTool {
            name: spec.name.clone(),
            description: spec.description.clone(),
            input_schema: spec.input_schema.clone(),
        }
    }
}

impl std::fmt::Display for AnthropicBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anthropic({})", self.model)
    }
}

impl Backend for AnthropicBackend {
    async fn stream(
        &self,
        request: ModelRequest<'_>,
        sink: &EventSink,
    ) -> std::result::Result<ModelResponse, ModelError> {
        let api_messages: Vec<ApiMessage> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(Self::message_to_api)
            .collect();

        let tools: Vec<ApiTool> = request.tools.iter().map(Self::tool_to_api).collect();

        let api_request = ApiRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            stream: true,
            messages: api_messages,
            system: self.system.clone(),
            tools,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .header("accept", "text/event-stream")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        let mut assembler = MessageAssembler::default();
        let mut events = response.bytes_stream().eventsource();

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| ModelError::Network(e.to_string()))?;
            if event.data.is_empty() {
                continue;
            }
            let parsed: ApiStreamEvent = serde_json::from_str(&event.data).map_err(|e| {
                ModelError::InvalidResponse(format!("{e}, data: {}", event.data))
            })?;
            let done = matches!(parsed, ApiStreamEvent::MessageStop);
            if let Some(text) = assembler.apply(parsed)? {
                sink.send(AgentEvent::TextDelta { text });
            }
            if done {
                break;
            }
        }

        assembler.finish()
    }
}

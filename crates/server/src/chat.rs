//! The chat endpoint: full message history in, SSE event stream out.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;

use runtime::{Agent, AgentEvent, Backend, EventSink, Message, Role, ToolHost};

/// Wall-clock guard on one whole agent run, tool calls included.
const RUN_TIMEOUT: Duration = Duration::from_secs(30);

/// Inbound chat request: the full running history, client-owned.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<WireMessage>,
}

/// One history entry as the client sends it.
#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    System,
    User,
    Assistant,
}

impl From<WireRole> for Role {
    fn from(role: WireRole) -> Self {
        match role {
            WireRole::System => Role::System,
            WireRole::User => Role::User,
            WireRole::Assistant => Role::Assistant,
        }
    }
}

impl WireMessage {
    fn into_message(self) -> Message {
        Message::new(self.role.into(), self.content)
    }
}

/// Build the application router around one shared agent.
///
/// Requests share nothing but the agent itself; each run gets a fresh event
/// channel and transcript.
pub fn app<B, H>(agent: Arc<Agent<B, H>>) -> Router
where
    B: Backend + 'static,
    H: ToolHost + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/v1/chat", post(chat::<B, H>))
        .with_state(agent)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat<B, H>(
    State(agent): State<Arc<Agent<B, H>>>,
    Json(request): Json<ChatRequest>,
) -> Response
where
    B: Backend + 'static,
    H: ToolHost + 'static,
{
    if request.messages.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "messages must not be empty" })),
        )
            .into_response();
    }

    let messages: Vec<Message> = request
        .messages
        .into_iter()
        .map(WireMessage::into_message)
        .collect();

    tracing::info!(history_len = messages.len(), "chat turn accepted");

    let (sink, rx) = EventSink::channel();

    // The run owns the sink; when it finishes (or is cut off) the sink drops
    // and the SSE stream below closes.
    tokio::spawn(async move {
        match tokio::time::timeout(RUN_TIMEOUT, agent.run(messages, &sink)).await {
            Ok(Ok(outcome)) => {
                tracing::info!(reason = ?outcome.reason, "turn finished");
            }
            Ok(Err(e)) => {
                // The agent already emitted the Error event.
                tracing::error!(error = %e, "turn failed");
            }
            Err(_) => {
                tracing::error!(timeout_secs = RUN_TIMEOUT.as_secs(), "turn cut off");
                sink.send(AgentEvent::Error {
                    message: format!("request exceeded {}s", RUN_TIMEOUT.as_secs()),
                });
            }
        }
    });

    let stream = UnboundedReceiverStream::new(rx).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().event(event.kind()).data(data))
    });

    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

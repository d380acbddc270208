//! Incremental events emitted to the caller during one turn.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::model::{StopReason, ToolCall, ToolResult, Usage};

/// Incremental output of one agent run.
///
/// `Done` and `Error` are terminal; exactly one of them closes every run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A fragment of assistant text, in order of arrival.
    TextDelta { text: String },
    /// The model requested a tool invocation.
    ToolCallStarted { call: ToolCall },
    /// The matching result, keyed by call id.
    ToolCallFinished { result: ToolResult },
    /// The turn completed.
    Done { reason: StopReason, usage: Usage },
    /// The turn failed.
    Error { message: String },
}

impl AgentEvent {
    /// Wire name for this event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TextDelta { .. } => "message_delta",
            Self::ToolCallStarted { .. } => "tool_call",
            Self::ToolCallFinished { .. } => "tool_result",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }
}

/// Sender half handed to the backend and orchestrator.
///
/// A failed send means the receiver (the client connection) is gone; events
/// are dropped and the run decides on its own when to stop.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<AgentEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AgentEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, event: AgentEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tags() {
        let event = AgentEvent::TextDelta {
            text: "hi".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "text_delta");
        assert_eq!(json["text"], "hi");
        assert_eq!(event.kind(), "message_delta");
    }

    #[test]
    fn dropped_receiver_does_not_panic() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.send(AgentEvent::Error {
            message: "client gone".into(),
        });
    }
}

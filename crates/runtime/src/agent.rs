//! Conversation orchestration: the bounded model/tool loop.

use crate::event::{AgentEvent, EventSink};
use crate::host::ToolHost;
use crate::model::{Backend, Message, ModelRequest, ModelResponse, StopReason, ToolCall, ToolResult, Usage};
use crate::{Error, Result};

/// Upper bound on model invocations per turn. Guarantees termination of the
/// tool-calling loop regardless of what the model asks for.
pub const MAX_STEPS: u32 = 5;

/// What the orchestrator is doing between transitions.
#[derive(Debug)]
enum Phase {
    AwaitingModel,
    ExecutingTools(Vec<ToolCall>),
    Done(StopReason),
}

/// Final state of one turn.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The full transcript, including tool calls and results.
    pub messages: Vec<Message>,
    pub reason: StopReason,
    /// Token usage summed over every model step.
    pub usage: Usage,
}

/// Drives one conversation turn to completion.
///
/// The loop is an explicit state machine: AwaitingModel submits the history
/// plus tool specs and streams the response; ExecutingTools resolves every
/// requested call before the next model step; Done emits the terminal event.
/// Each run is independent; no state survives between turns.
pub struct Agent<B, H> {
    backend: B,
    tools: H,
    max_steps: u32,
}

impl<B: Backend, H: ToolHost> Agent<B, H> {
    pub fn new(backend: B, tools: H) -> Self {
        Self {
            backend,
            tools,
            max_steps: MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Run the loop until a final answer or the step bound.
    ///
    /// Every tool call produces exactly one result before the next model
    /// step. A tool failure becomes an error payload for the model to explain
    /// to the user, never a fault that aborts the turn; only backend failures
    /// end the run early, and those emit an `Error` event before returning.
    pub async fn run(&self, mut messages: Vec<Message>, sink: &EventSink) -> Result<TurnOutcome> {
        let specs = self.tools.specs();
        let mut usage = Usage::default();
        let mut steps = 0u32;
        let mut phase = Phase::AwaitingModel;

        loop {
            phase = match phase {
                Phase::AwaitingModel => {
                    steps += 1;
                    tracing::debug!(step = steps, "requesting model response");
                    let request = ModelRequest {
                        messages: &messages,
                        tools: &specs,
                    };
                    let ModelResponse {
                        message,
                        stop_reason,
                        usage: step_usage,
                    } = match self.backend.stream(request, sink).await {
                        Ok(response) => response,
                        Err(e) => {
                            sink.send(AgentEvent::Error {
                                message: e.to_string(),
                            });
                            return Err(Error::Model(e));
                        }
                    };
                    usage.add(step_usage);

                    let calls = message.tool_calls();
                    messages.push(message);

                    if calls.is_empty() {
                        Phase::Done(stop_reason)
                    } else if steps >= self.max_steps {
                        // The bound is reached with tools still pending; no
                        // further model step could consume their results, so
                        // the content streamed so far is the answer.
                        tracing::warn!(steps, "step bound reached with pending tool calls");
                        Phase::Done(StopReason::StepLimit)
                    } else {
                        Phase::ExecutingTools(calls)
                    }
                }
                Phase::ExecutingTools(calls) => {
                    let mut results = Vec::with_capacity(calls.len());
                    for call in calls {
                        tracing::info!(tool = %call.name, id = %call.id, "executing tool call");
                        sink.send(AgentEvent::ToolCallStarted { call: call.clone() });
                        let outcome = self.tools.execute(&call).await;
                        let result = match outcome {
                            Ok(output) => ToolResult::Success {
                                tool_call_id: call.id,
                                output,
                            },
                            Err(error) => ToolResult::Failure {
                                tool_call_id: call.id,
                                error,
                            },
                        };
                        sink.send(AgentEvent::ToolCallFinished {
                            result: result.clone(),
                        });
                        results.push(result);
                    }
                    messages.push(Message::tool_results(results));
                    Phase::AwaitingModel
                }
                Phase::Done(reason) => {
                    sink.send(AgentEvent::Done {
                        reason: reason.clone(),
                        usage,
                    });
                    return Ok(TurnOutcome {
                        messages,
                        reason,
                        usage,
                    });
                }
            };
        }
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced at the tool boundary.
///
/// Every variant renders as a human-readable string. The orchestrator feeds
/// these back to the model as error payloads instead of aborting the
/// conversation, so the model can explain the failure to the user.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("forecast service returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("malformed forecast response: {0}")]
    MalformedResponse(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("execution timed out after {0}s")]
    Timeout(u64),
    #[error("interpreter not found: {0}")]
    InterpreterNotFound(String),
    #[error("failed to spawn interpreter: {0}")]
    Spawn(String),
    #[error("output too large: {size} bytes (max {max})")]
    OutputTooLarge { size: usize, max: usize },
    #[error("execution failed: {0}")]
    Execution(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;

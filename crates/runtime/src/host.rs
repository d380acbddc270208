//! Tool host seam.
//!
//! This is the boundary between the model loop and side effects: the
//! orchestrator only ever sees specifications and an execute operation.

use std::future::Future;

use serde_json::Value;
use tools::{Registry, ToolError};

use crate::model::{ToolCall, ToolSpec};

/// Trait for tool execution hosts.
pub trait ToolHost: Send + Sync {
    /// Available tool specifications.
    fn specs(&self) -> Vec<ToolSpec>;

    /// Execute a tool call.
    fn execute(&self, call: &ToolCall) -> impl Future<Output = Result<Value, ToolError>> + Send;
}

/// A no-op tool host with no tools.
///
/// Useful for testing or when tools are not needed.
#[derive(Debug, Default)]
pub struct EmptyToolHost;

impl ToolHost for EmptyToolHost {
    fn specs(&self) -> Vec<ToolSpec> {
        Vec::new()
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        Err(ToolError::NotFound(call.name.clone()))
    }
}

/// Adapter exposing a tool [`Registry`] to the model loop.
pub struct RegistryHost {
    registry: Registry,
}

impl RegistryHost {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }
}

impl ToolHost for RegistryHost {
    fn specs(&self) -> Vec<ToolSpec> {
        self.registry
            .specs()
            .into_iter()
            .map(|spec| ToolSpec {
                name: spec.name,
                description: spec.description,
                input_schema: spec.input_schema,
            })
            .collect()
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        self.registry.invoke(&call.name, call.input.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_host_has_no_tools() {
        let host = EmptyToolHost;
        assert!(host.specs().is_empty());

        let call = ToolCall {
            id: "1".into(),
            name: "anything".into(),
            input: Value::Null,
        };
        let err = host.execute(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)), "{err:?}");
    }

    #[tokio::test]
    async fn registry_host_converts_specs_and_dispatches() {
        let host = RegistryHost::new(Registry::builtin(
            tools::ForecastClient::new(),
            tools::PythonRunner::new(),
        ));
        let names: Vec<String> = host.specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["get_weather", "run_python"]);

        let call = ToolCall {
            id: "1".into(),
            name: "no_such_tool".into(),
            input: Value::Null,
        };
        let err = host.execute(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)), "{err:?}");
    }
}

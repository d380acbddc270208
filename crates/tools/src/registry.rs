//! Tool registry: name → implementation dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ToolError;
use crate::forecast::{ForecastClient, ForecastTool};
use crate::python::{PythonRunner, PythonTool};
use crate::tool::{Tool, ToolSpec};

/// The tools available to a conversation.
///
/// Holds each tool under its model-visible name and dispatches calls by name.
/// Independent per construction; no process-wide state.
pub struct Registry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry with the two production tools: `get_weather` and `run_python`.
    pub fn builtin(forecast: ForecastClient, python: PythonRunner) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ForecastTool::new(forecast)));
        registry.register(Arc::new(PythonTool::new(python)));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Specifications for every registered tool, in stable name order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(|t| t.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Dispatch a call to the named tool.
    pub async fn invoke(&self, name: &str, input: Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tracing::info!(tool = name, "invoking tool");
        tool.invoke(input).await
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

//! Python code execution in a short-lived subprocess.
//!
//! One interpreter process per call, code passed as a single argv element
//! (never through a shell), wall-clock timeout, combined output cap. There is
//! no sandboxing beyond that: executed code runs with the privileges of the
//! host process. That is a stated trust boundary of this system, not a bug.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::ToolError;
use crate::tool::Tool;

/// Wall-clock budget for one execution.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Combined stdout+stderr cap (1 MiB).
pub const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

#[cfg(windows)]
const DEFAULT_INTERPRETER: &str = "python";
#[cfg(not(windows))]
const DEFAULT_INTERPRETER: &str = "python3";

#[derive(Debug, Clone, Deserialize)]
struct ExecParams {
    code: String,
}

/// Outcome of a completed execution.
///
/// A non-zero exit code is still an outcome, not an error: stderr carries the
/// traceback for the model to interpret. Only infrastructure failures
/// (timeout, missing interpreter, spawn failure) surface as [`ToolError`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Spawns one interpreter process per call.
#[derive(Debug, Clone)]
pub struct PythonRunner {
    interpreter: String,
    timeout: Duration,
}

impl PythonRunner {
    pub fn new() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the interpreter can be invoked on this host.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.interpreter)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Execute `code` as `<interpreter> -c <code>` and wait for it to exit.
    pub async fn run(&self, code: &str) -> Result<ExecOutcome, ToolError> {
        if code.is_empty() {
            return Err(ToolError::InvalidInput(
                "code must be a non-empty string".into(),
            ));
        }

        let mut cmd = Command::new(&self.interpreter);
        cmd.arg("-c")
            .arg(code)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ToolError::InterpreterNotFound(self.interpreter.clone())
            }
            _ => ToolError::Spawn(e.to_string()),
        })?;

        // On expiry the wait future is dropped and kill_on_drop reaps the
        // child; no partial output is returned.
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(ToolError::Spawn(e.to_string())),
            Err(_) => {
                tracing::debug!(timeout_secs = self.timeout.as_secs(), "execution timed out");
                return Err(ToolError::Timeout(self.timeout.as_secs()));
            }
        };

        let combined = output.stdout.len() + output.stderr.len();
        if combined > MAX_OUTPUT_BYTES {
            return Err(ToolError::OutputTooLarge {
                size: combined,
                max: MAX_OUTPUT_BYTES,
            });
        }

        let exit_code = output.status.code().unwrap_or(-1);
        tracing::debug!(exit_code, "execution finished");

        Ok(ExecOutcome {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
        })
    }
}

impl Default for PythonRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// The code executor as a model-visible tool, exposed as `run_python`.
pub struct PythonTool {
    runner: PythonRunner,
}

impl PythonTool {
    pub fn new(runner: PythonRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Tool for PythonTool {
    fn name(&self) -> &str {
        "run_python"
    }

    fn description(&self) -> &str {
        "Execute Python code for data analysis, calculations, or processing. \
         Returns stdout, stderr, and the exit code."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "Python code to execute"
                }
            },
            "required": ["code"]
        })
    }

    async fn invoke(&self, input: Value) -> Result<Value, ToolError> {
        let params: ExecParams =
            serde_json::from_value(input).map_err(|e| ToolError::InvalidInput(e.to_string()))?;
        let outcome = self.runner.run(&params.code).await?;
        serde_json::to_value(&outcome).map_err(|e| ToolError::Execution(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn runner() -> Option<PythonRunner> {
        let runner = PythonRunner::new();
        // Skip on hosts without a Python interpreter.
        runner.is_available().await.then_some(runner)
    }

    #[tokio::test]
    async fn simple_expression_prints_to_stdout() {
        let Some(runner) = runner().await else { return };
        let outcome = runner.run("print(2+2)").await.unwrap();
        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.stdout.contains('4'));
        assert!(outcome.stderr.is_empty());
    }

    #[tokio::test]
    async fn runtime_exception_is_an_outcome_not_an_error() {
        let Some(runner) = runner().await else { return };
        let outcome = runner.run("raise ValueError('boom')").await.unwrap();
        assert_ne!(outcome.exit_code, 0);
        assert!(outcome.stderr.contains("ValueError"));
        assert!(outcome.stderr.contains("Traceback"));
    }

    #[tokio::test]
    async fn infinite_loop_is_killed_at_the_timeout() {
        let Some(runner) = runner().await else { return };
        let runner = runner.with_timeout(Duration::from_millis(300));
        let err = runner.run("while True: pass").await.unwrap_err();
        assert!(matches!(err, ToolError::Timeout(_)), "{err:?}");
    }

    #[tokio::test]
    async fn missing_interpreter_is_a_distinct_error() {
        let runner = PythonRunner::new().with_interpreter("definitely-not-a-python");
        let err = runner.run("print(1)").await.unwrap_err();
        match err {
            ToolError::InterpreterNotFound(name) => {
                assert_eq!(name, "definitely-not-a-python");
            }
            other => panic!("expected InterpreterNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_code_rejected_before_spawning() {
        // A bogus interpreter would fail at spawn; validation must win.
        let runner = PythonRunner::new().with_interpreter("definitely-not-a-python");
        let err = runner.run("").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)), "{err:?}");
    }

    #[tokio::test]
    async fn oversized_output_is_rejected() {
        let Some(runner) = runner().await else { return };
        // Two MiB of output blows the combined cap.
        let err = runner
            .run("print('x' * (2 * 1024 * 1024))")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::OutputTooLarge { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn tool_requires_a_code_argument() {
        let tool = PythonTool::new(PythonRunner::new());
        let err = tool.invoke(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)), "{err:?}");
    }
}

//! Built-in tools for the steward assistant.
//!
//! Two capabilities are exposed to the model: `get_weather` fetches a daily
//! forecast from Open-Meteo, and `run_python` executes a Python snippet in a
//! local subprocess. The [`Registry`] holds them under their model-visible
//! names and dispatches calls; every failure is a structured [`ToolError`]
//! rather than an unhandled fault, so the conversation always continues.

mod error;
pub mod forecast;
pub mod python;
mod registry;
mod tool;

pub use error::{Result, ToolError};
pub use forecast::{DEFAULT_BASE_URL, Forecast, ForecastClient, ForecastParams, ForecastTool};
pub use python::{DEFAULT_TIMEOUT, ExecOutcome, MAX_OUTPUT_BYTES, PythonRunner, PythonTool};
pub use registry::Registry;
pub use tool::{Tool, ToolSpec};

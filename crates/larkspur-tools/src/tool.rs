use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;

/// The worker role a tool set is assembled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerRole {
  Researcher,
  Coder,
}

impl WorkerRole {
  pub fn as_str(self) -> &'static str {
    match self {
      WorkerRole::Researcher => "researcher",
      WorkerRole::Coder => "coder",
    }
  }
}

impl fmt::Display for WorkerRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A tool a worker can invoke during step execution.
#[async_trait]
pub trait Tool: Send + Sync {
  fn name(&self) -> &str;

  fn description(&self) -> &str;

  /// JSON Schema for the tool arguments.
  fn parameters(&self) -> Value;

  /// Invoke the tool. The returned string is fed back to the model
  /// verbatim as a tool result.
  async fn call(&self, arguments: Value) -> Result<String, ToolError>;
}

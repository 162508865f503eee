use std::fmt;

use async_trait::async_trait;
use larkspur_state::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LlmError;

/// The workflow role a model client serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRole {
  Coordinator,
  Planner,
  Researcher,
  Coder,
  Reporter,
}

impl fmt::Display for ModelRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ModelRole::Coordinator => "coordinator",
      ModelRole::Planner => "planner",
      ModelRole::Researcher => "researcher",
      ModelRole::Coder => "coder",
      ModelRole::Reporter => "reporter",
    };
    f.write_str(name)
  }
}

/// A tool made available to the model for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
  pub name: String,
  pub description: String,
  /// JSON Schema for the tool arguments.
  pub parameters: Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
  pub name: String,
  pub arguments: Value,
}

impl ToolCall {
  /// A string-typed argument, if present.
  pub fn string_arg(&self, key: &str) -> Option<&str> {
    self.arguments.get(key).and_then(|v| v.as_str())
  }
}

/// One model completion: text plus any requested tool invocations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
  pub content: String,
  pub tool_calls: Vec<ToolCall>,
}

/// A language model client.
///
/// Implementations must be safe to share across the workflow; the engine
/// holds them behind `Arc` in the [`crate::ModelRegistry`].
#[async_trait]
pub trait ChatModel: Send + Sync {
  /// Complete the conversation, optionally binding `tools` so the
  /// response may carry tool invocation requests.
  async fn chat(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ChatResponse, LlmError>;
}

//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use larkspur_state::{Message, MessageRole};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::LlmError;
use crate::model::{ChatModel, ChatResponse, ToolCall, ToolSpec};

/// Configuration for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
  /// Endpoint base, e.g. `https://api.openai.com/v1`.
  pub base_url: String,
  pub api_key: Option<String>,
  pub model: String,
}

/// Chat client for OpenAI-compatible chat-completions endpoints.
pub struct OpenAiChatModel {
  http: reqwest::Client,
  config: OpenAiConfig,
}

impl OpenAiChatModel {
  pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
    let http = reqwest::Client::builder().build()?;
    Ok(Self { http, config })
  }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
  async fn chat(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ChatResponse, LlmError> {
    let request = WireRequest {
      model: &self.config.model,
      messages: messages.iter().map(WireMessage::from).collect(),
      tools: if tools.is_empty() {
        None
      } else {
        Some(tools.iter().map(WireTool::from).collect())
      },
    };

    let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
    let mut builder = self.http.post(&url).json(&request);
    if let Some(key) = &self.config.api_key {
      builder = builder.bearer_auth(key);
    }

    let response = builder.send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(LlmError::Api {
        status: status.as_u16(),
        body,
      });
    }

    let completion: WireCompletion = response.json().await?;
    let choice = completion
      .choices
      .into_iter()
      .next()
      .ok_or(LlmError::EmptyResponse)?;

    let tool_calls = choice
      .message
      .tool_calls
      .unwrap_or_default()
      .into_iter()
      .map(|call| ToolCall {
        name: call.function.name,
        // Endpoints send arguments as a JSON-encoded string; tolerate
        // malformed ones rather than failing the whole completion.
        arguments: serde_json::from_str(&call.function.arguments)
          .unwrap_or(Value::String(call.function.arguments)),
      })
      .collect::<Vec<_>>();

    debug!(
      model = %self.config.model,
      tool_calls = tool_calls.len(),
      "chat completion received"
    );

    Ok(ChatResponse {
      content: choice.message.content.unwrap_or_default(),
      tool_calls,
    })
  }
}

#[derive(Serialize)]
struct WireRequest<'a> {
  model: &'a str,
  messages: Vec<WireMessage<'a>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  tools: Option<Vec<WireTool<'a>>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
  role: &'static str,
  content: &'a str,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
  fn from(message: &'a Message) -> Self {
    let role = match message.role {
      MessageRole::System => "system",
      MessageRole::User => "user",
      MessageRole::Assistant => "assistant",
    };
    Self {
      role,
      content: &message.content,
    }
  }
}

#[derive(Serialize)]
struct WireTool<'a> {
  #[serde(rename = "type")]
  kind: &'static str,
  function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
  name: &'a str,
  description: &'a str,
  parameters: &'a Value,
}

impl<'a> From<&'a ToolSpec> for WireTool<'a> {
  fn from(spec: &'a ToolSpec) -> Self {
    Self {
      kind: "function",
      function: WireFunction {
        name: &spec.name,
        description: &spec.description,
        parameters: &spec.parameters,
      },
    }
  }
}

#[derive(Deserialize)]
struct WireCompletion {
  choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
  message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
  content: Option<String>,
  tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireToolCall {
  function: WireCalledFunction,
}

#[derive(Deserialize)]
struct WireCalledFunction {
  name: String,
  arguments: String,
}

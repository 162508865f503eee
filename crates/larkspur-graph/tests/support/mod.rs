//! Shared test doubles for engine tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use larkspur_llm::{ChatModel, ChatResponse, LlmError, ToolCall, ToolSpec};
use larkspur_state::Message;
use serde_json::json;

/// A model that replays a fixed sequence of responses.
///
/// Once the script is exhausted it answers with empty content, which the
/// nodes treat as a plain completion.
pub struct ScriptedModel {
  responses: Mutex<VecDeque<ChatResponse>>,
  calls: AtomicUsize,
}

impl ScriptedModel {
  pub fn new(responses: Vec<ChatResponse>) -> Arc<Self> {
    Arc::new(Self {
      responses: Mutex::new(responses.into()),
      calls: AtomicUsize::new(0),
    })
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl ChatModel for ScriptedModel {
  async fn chat(
    &self,
    _messages: &[Message],
    _tools: &[ToolSpec],
  ) -> Result<ChatResponse, LlmError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let response = self.responses.lock().unwrap().pop_front();
    Ok(response.unwrap_or_default())
  }
}

/// A model that takes `delay` to answer; used to trip deadlines.
pub struct SlowModel {
  pub delay: Duration,
  pub reply: String,
}

#[async_trait]
impl ChatModel for SlowModel {
  async fn chat(
    &self,
    _messages: &[Message],
    _tools: &[ToolSpec],
  ) -> Result<ChatResponse, LlmError> {
    tokio::time::sleep(self.delay).await;
    Ok(ChatResponse {
      content: self.reply.clone(),
      tool_calls: Vec::new(),
    })
  }
}

/// A plain-text completion.
pub fn text(content: &str) -> ChatResponse {
  ChatResponse {
    content: content.to_string(),
    tool_calls: Vec::new(),
  }
}

/// A coordinator completion that requests the planner handoff.
pub fn handoff(topic: &str, locale: &str) -> ChatResponse {
  ChatResponse {
    content: String::new(),
    tool_calls: vec![ToolCall {
      name: "hand_off_to_planner".to_string(),
      arguments: json!({ "research_topic": topic, "locale": locale }),
    }],
  }
}

/// Planner output: a two-step plan needing execution.
pub fn two_step_plan_json() -> String {
  json!({
    "locale": "en-US",
    "has_enough_context": false,
    "thought": "gather data, then analyze it",
    "title": "EV adoption research",
    "steps": [
      {
        "need_search": true,
        "title": "Collect sales data",
        "description": "Find EV sales numbers for Norway",
        "step_type": "research"
      },
      {
        "need_search": false,
        "title": "编写算法并绘图",
        "description": "Process the collected numbers",
        "step_type": "processing"
      }
    ]
  })
  .to_string()
}

/// Planner output that already has enough context.
pub fn sufficient_plan_json() -> String {
  json!({
    "locale": "en-US",
    "has_enough_context": true,
    "thought": "the answer is already known",
    "title": "Known-answer research",
    "steps": []
  })
  .to_string()
}

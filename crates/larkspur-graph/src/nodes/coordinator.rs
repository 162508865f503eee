//! Coordinator node.
//!
//! First point of contact. The coordinator either answers the request
//! directly (greetings, small talk, trivia) or signals a research
//! handoff by calling the `hand_off_to_planner` tool, which carries the
//! detected research topic and locale.

use larkspur_llm::{ModelRegistry, ModelRole, ToolSpec};
use larkspur_prompts::TemplateVars;
use larkspur_state::{Message, StateDelta, WorkflowState};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::config::WorkflowConfig;
use crate::nodes::NodeOutcome;
use crate::routing::NodeId;

/// Tool the model calls to signal a research request.
pub const HANDOFF_TOOL: &str = "hand_off_to_planner";

fn handoff_tool_spec() -> ToolSpec {
  ToolSpec {
    name: HANDOFF_TOOL.to_string(),
    description: "Hand the request off to the planner to start a research workflow.".to_string(),
    parameters: json!({
      "type": "object",
      "properties": {
        "research_topic": {
          "type": "string",
          "description": "The topic of the research task to be handed off."
        },
        "locale": {
          "type": "string",
          "description": "The user's detected language locale, e.g. en-US or zh-CN."
        }
      },
      "required": ["research_topic", "locale"]
    }),
  }
}

#[instrument(name = "coordinator", skip_all)]
pub async fn run(
  state: &WorkflowState,
  config: &WorkflowConfig,
  models: &ModelRegistry,
) -> NodeOutcome {
  let messages = match larkspur_prompts::render("coordinator", state, TemplateVars::default()) {
    Ok(messages) => messages,
    Err(e) => {
      warn!(error = %e, "coordinator template failed, using dialogue log only");
      state.messages.clone()
    }
  };

  let model = match models.get(ModelRole::Coordinator) {
    Ok(model) => model,
    Err(e) => return direct_end(config, format!("I could not process this request: {}", e)),
  };

  match model.chat(&messages, &[handoff_tool_spec()]).await {
    Ok(response) if !response.tool_calls.is_empty() => {
      let mut locale = state.locale.clone();
      let mut research_topic = state.research_topic.clone();
      for call in &response.tool_calls {
        if call.name != HANDOFF_TOOL {
          continue;
        }
        if let (Some(topic), Some(detected)) =
          (call.string_arg("research_topic"), call.string_arg("locale"))
        {
          research_topic = topic.to_string();
          locale = detected.to_string();
          break;
        }
      }
      info!(topic = %research_topic, locale = %locale, "research handoff requested");

      NodeOutcome {
        delta: StateDelta {
          locale: Some(locale),
          research_topic: Some(research_topic),
          resources: Some(config.resources.clone()),
          ..StateDelta::default()
        },
        goto: None,
      }
    }
    Ok(response) => {
      // No handoff: the coordinator's answer is the whole exchange.
      info!("coordinator handled the request directly");
      direct_end(config, response.content)
    }
    Err(e) => {
      warn!(error = %e, "coordinator model invocation failed");
      direct_end(config, format!("I could not process this request: {}", e))
    }
  }
}

fn direct_end(config: &WorkflowConfig, content: String) -> NodeOutcome {
  NodeOutcome {
    delta: StateDelta {
      messages: vec![Message::assistant(content).named("coordinator")],
      research_topic: Some(String::new()),
      resources: Some(config.resources.clone()),
      ..StateDelta::default()
    },
    goto: Some(NodeId::End),
  }
}

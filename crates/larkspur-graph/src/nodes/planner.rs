//! Planner node.
//!
//! Produces either a validated plan or raw draft text for the feedback
//! gate. The iteration ceiling is checked before anything else so a
//! stuck revision loop can never invoke the model again.

use larkspur_llm::{ModelRegistry, ModelRole, repair_json};
use larkspur_plan::{Plan, PlanDraft};
use larkspur_prompts::TemplateVars;
use larkspur_state::{Message, StateDelta, WorkflowState};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::config::WorkflowConfig;
use crate::error::GraphError;
use crate::nodes::NodeOutcome;
use crate::routing::NodeId;

#[instrument(name = "planner", skip_all, fields(iterations = state.plan_iterations))]
pub async fn run(
  state: &WorkflowState,
  config: &WorkflowConfig,
  models: &ModelRegistry,
) -> NodeOutcome {
  if state.plan_iterations >= config.max_plan_iterations {
    info!(
      iterations = state.plan_iterations,
      ceiling = config.max_plan_iterations,
      "plan iteration ceiling reached, reporting with what we have"
    );
    return NodeOutcome::goto(NodeId::Reporter);
  }

  let vars = TemplateVars {
    max_step_num: config.max_step_num,
  };
  let messages = match larkspur_prompts::render("planner", state, vars) {
    Ok(messages) => messages,
    Err(e) => {
      warn!(error = %e, "planner template failed, using dialogue log only");
      state.messages.clone()
    }
  };

  let model = match models.get(ModelRole::Planner) {
    Ok(model) => model,
    Err(e) => {
      error!(error = %e, "no planner model available");
      return NodeOutcome::goto(NodeId::End);
    }
  };

  let response = match model.chat(&messages, &[]).await {
    Ok(response) => response,
    Err(e) => {
      error!(error = %e, "planner model invocation failed");
      return NodeOutcome::goto(NodeId::End);
    }
  };

  let repaired = repair_json(&response.content);
  let value: Value = match serde_json::from_str(&repaired) {
    Ok(value) => value,
    Err(e) => return parse_failure(state, GraphError::PlanParse { detail: e.to_string() }),
  };

  let has_enough_context = value
    .get("has_enough_context")
    .and_then(|v| v.as_bool())
    .unwrap_or(false);

  if has_enough_context {
    // A sufficient plan skips review, so it must validate fully here.
    match serde_json::from_value::<Plan>(value) {
      Ok(plan) => {
        info!(title = %plan.title, "plan has enough context, skipping review");
        NodeOutcome {
          delta: StateDelta {
            messages: vec![Message::assistant(response.content).named("planner")],
            current_plan: Some(PlanDraft::Plan(plan)),
            ..StateDelta::default()
          },
          goto: None,
        }
      }
      Err(e) => parse_failure(state, GraphError::PlanParse { detail: e.to_string() }),
    }
  } else {
    // Keep the raw text; the feedback gate repairs and parses it once a
    // human (or auto-accept) signs off.
    info!("plan drafted, awaiting review");
    NodeOutcome {
      delta: StateDelta {
        messages: vec![Message::assistant(response.content.clone()).named("planner")],
        current_plan: Some(PlanDraft::Raw(response.content)),
        ..StateDelta::default()
      },
      goto: None,
    }
  }
}

/// A malformed plan is recoverable only if an earlier revision exists.
fn parse_failure(state: &WorkflowState, error: GraphError) -> NodeOutcome {
  error!(error = %error, "planner output did not parse");
  if state.plan_iterations > 0 {
    NodeOutcome::goto(NodeId::Reporter)
  } else {
    NodeOutcome::goto(NodeId::End)
  }
}

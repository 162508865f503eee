//! Step-execution engine for the researcher and coder workers.
//!
//! Executes exactly one pending step of the accepted plan under a
//! deadline and always produces a result: output text, a placeholder for
//! empty output, or a descriptive error. The result is written into the
//! step, appended to the observations, logged as a worker message, and
//! control returns to the dispatcher. Nothing escapes this node.

use std::sync::Arc;
use std::time::Duration;

use larkspur_llm::{ChatModel, ModelRegistry, ModelRole, ToolSpec};
use larkspur_plan::{Step, classify};
use larkspur_prompts::TemplateVars;
use larkspur_state::{Message, StateDelta, WorkflowState};
use larkspur_tools::{Tool, WorkerRole, base_tools, provision_tools};
use tracing::{info, instrument, warn};

use crate::config::WorkflowConfig;
use crate::error::GraphError;
use crate::nodes::NodeOutcome;
use crate::routing::NodeId;

/// Formatting instruction appended for the researcher: references go in
/// a trailing list, never inline.
const CITATION_INSTRUCTION: &str = "IMPORTANT: do not use inline citations in the body. \
   Put a reference section at the end using link format, with a blank \
   line between entries:\n- [Source Title](url)\n\n- [Another Source](url)";

#[instrument(name = "worker", skip_all, fields(worker = %role))]
pub async fn run(
  role: WorkerRole,
  state: &WorkflowState,
  config: &WorkflowConfig,
  models: &ModelRegistry,
) -> NodeOutcome {
  let Some(plan) = state.current_plan.as_ref().and_then(|draft| draft.as_plan()) else {
    warn!("worker invoked without an accepted plan");
    return NodeOutcome::goto(NodeId::ResearchTeam);
  };
  let Some(step) = plan.first_pending_step() else {
    info!("all steps executed, proceeding to report generation");
    return NodeOutcome::goto(NodeId::Reporter);
  };

  let messages = assemble_task_messages(role, state, plan, step);
  let tools = provision_tools(
    role,
    base_tools(role, &state.resources, config.max_search_results),
    &config.tool_servers,
  )
  .await;

  let category = classify(&step.title, &step.description, Some(step.step_type));
  let deadline = if category.extended_deadline() {
    config.summary_step_timeout
  } else {
    config.step_timeout
  };
  info!(step = %step.title, category = ?category, deadline_secs = deadline.as_secs(), "executing step");

  let execution_result = match models.get(model_role(role)) {
    Err(e) => format!(
      "Error: {}",
      GraphError::StepExecution {
        worker: role.to_string(),
        step: step.title.clone(),
        detail: e.to_string(),
      }
    ),
    Ok(model) => {
      execute_step(role, model, &tools, messages, step, deadline, config.agent_step_budget()).await
    }
  };

  NodeOutcome {
    delta: StateDelta {
      messages: vec![Message::user(execution_result.clone()).named(role.as_str())],
      observations: vec![execution_result.clone()],
      step_result: Some(execution_result),
      ..StateDelta::default()
    },
    goto: Some(NodeId::ResearchTeam),
  }
}

/// Build the worker's message list: role prompt, completed-step findings,
/// the current task, and (for the researcher) resources and citation
/// formatting rules.
fn assemble_task_messages(
  role: WorkerRole,
  state: &WorkflowState,
  plan: &larkspur_plan::Plan,
  step: &Step,
) -> Vec<Message> {
  let mut task = String::new();
  let completed: Vec<&Step> = plan.completed_steps().collect();
  if !completed.is_empty() {
    task.push_str("# Existing Research Findings\n\n");
    for (i, done) in completed.iter().enumerate() {
      task.push_str(&format!(
        "## Existing Finding {}: {}\n\n<finding>\n{}\n</finding>\n\n",
        i + 1,
        done.title,
        done.execution_res.as_deref().unwrap_or_default()
      ));
    }
  }
  task.push_str(&format!(
    "# Current Task\n\n## Title\n\n{}\n\n## Description\n\n{}\n\n## Locale\n\n{}",
    step.title, step.description, state.locale
  ));

  let template = match role {
    WorkerRole::Researcher => "researcher",
    WorkerRole::Coder => "coder",
  };
  let system = match larkspur_prompts::render_system(template, state, TemplateVars::default()) {
    Ok(system) => system,
    Err(e) => {
      warn!(error = %e, "worker template failed, using a minimal prompt");
      Message::system(format!("You are the {} of a deep research assistant.", role))
    }
  };

  let mut messages = vec![system, Message::user(task)];

  if role == WorkerRole::Researcher {
    if !state.resources.is_empty() {
      let mut resources = String::from("**The user mentioned the following resource files:**\n\n");
      for resource in &state.resources {
        resources.push_str(&format!("- {} ({})\n", resource.title, resource.description));
      }
      resources.push_str(
        "\n\nYou MUST use the local_search tool to retrieve information from the resource files.",
      );
      messages.push(Message::user(resources));
    }
    messages.push(Message::user(CITATION_INSTRUCTION).named("system"));
  }

  messages
}

/// Run the bounded worker invocation and fold every outcome into a
/// result string.
async fn execute_step(
  role: WorkerRole,
  model: Arc<dyn ChatModel>,
  tools: &[Arc<dyn Tool>],
  messages: Vec<Message>,
  step: &Step,
  deadline: Duration,
  step_budget: u32,
) -> String {
  match tokio::time::timeout(deadline, run_agent(model, tools, messages, step_budget)).await {
    Ok(Ok(output)) if !output.trim().is_empty() => {
      info!(step = %step.title, "step completed");
      output
    }
    Ok(Ok(_)) => {
      warn!(step = %step.title, "worker returned empty output");
      format!(
        "{} completed step '{}' but returned empty output.",
        role, step.title
      )
    }
    Ok(Err(e)) => {
      let error = GraphError::StepExecution {
        worker: role.to_string(),
        step: step.title.clone(),
        detail: e.to_string(),
      };
      warn!(error = %error, "step execution failed");
      format!("Error: {}", error)
    }
    Err(_) => {
      let error = GraphError::StepTimeout {
        worker: role.to_string(),
        step: step.title.clone(),
        elapsed_secs: deadline.as_secs(),
      };
      warn!(error = %error, "step execution timed out");
      format!("Error: {}. The step was not completed.", error)
    }
  }
}

/// The worker's inner tool-call loop, bounded by `step_budget` rounds.
async fn run_agent(
  model: Arc<dyn ChatModel>,
  tools: &[Arc<dyn Tool>],
  mut messages: Vec<Message>,
  step_budget: u32,
) -> Result<String, larkspur_llm::LlmError> {
  let specs: Vec<ToolSpec> = tools
    .iter()
    .map(|tool| ToolSpec {
      name: tool.name().to_string(),
      description: tool.description().to_string(),
      parameters: tool.parameters(),
    })
    .collect();

  for _ in 0..step_budget {
    let response = model.chat(&messages, &specs).await?;
    if response.tool_calls.is_empty() {
      return Ok(response.content);
    }

    let transcript = if response.content.is_empty() {
      let names: Vec<&str> = response.tool_calls.iter().map(|c| c.name.as_str()).collect();
      format!("Calling tools: {}", names.join(", "))
    } else {
      response.content.clone()
    };
    messages.push(Message::assistant(transcript));

    for call in response.tool_calls {
      let result = match tools.iter().find(|t| t.name() == call.name) {
        Some(tool) => match tool.call(call.arguments.clone()).await {
          Ok(output) => output,
          Err(e) => format!("Tool '{}' failed: {}", call.name, e),
        },
        None => format!("Tool '{}' is not available.", call.name),
      };
      messages.push(Message::user(result).named(call.name));
    }
  }

  Ok(format!(
    "Stopped after {} tool-call rounds without a final answer.",
    step_budget
  ))
}

fn model_role(role: WorkerRole) -> ModelRole {
  match role {
    WorkerRole::Researcher => ModelRole::Researcher,
    WorkerRole::Coder => ModelRole::Coder,
  }
}

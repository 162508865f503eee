//! Node identifiers and router functions.
//!
//! Routers are pure, total functions of the workflow state: they never
//! fail, never mutate, and always pick a forward-progressing node. The
//! dispatcher's worker choice comes from the same classifier that picks
//! execution deadlines, so the two can never disagree.

use std::fmt;

use larkspur_plan::{TaskCategory, classify};
use larkspur_state::WorkflowState;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The states of the workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
  Coordinator,
  BackgroundInvestigator,
  Planner,
  HumanFeedback,
  ResearchTeam,
  Researcher,
  Coder,
  Reporter,
  End,
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      NodeId::Coordinator => "coordinator",
      NodeId::BackgroundInvestigator => "background_investigator",
      NodeId::Planner => "planner",
      NodeId::HumanFeedback => "human_feedback",
      NodeId::ResearchTeam => "research_team",
      NodeId::Researcher => "researcher",
      NodeId::Coder => "coder",
      NodeId::Reporter => "reporter",
      NodeId::End => "end",
    };
    f.write_str(name)
  }
}

/// Route after the coordinator.
///
/// An empty research topic means the coordinator answered directly.
pub fn from_coordinator(state: &WorkflowState) -> NodeId {
  if state.research_topic.trim().is_empty() {
    return NodeId::End;
  }
  if state.enable_background_investigation {
    NodeId::BackgroundInvestigator
  } else {
    NodeId::Planner
  }
}

/// Route after the planner.
///
/// Raw output goes to the feedback gate for review; a plan that already
/// has enough context skips straight to reporting.
pub fn from_planner(state: &WorkflowState) -> NodeId {
  match &state.current_plan {
    Some(draft) if draft.is_raw() => NodeId::HumanFeedback,
    Some(draft) => match draft.as_plan() {
      Some(plan) if plan.has_enough_context => NodeId::Reporter,
      _ => NodeId::HumanFeedback,
    },
    None => NodeId::HumanFeedback,
  }
}

/// Route after the feedback gate.
pub fn from_human_feedback(state: &WorkflowState) -> NodeId {
  match state.current_plan.as_ref().and_then(|draft| draft.as_plan()) {
    Some(plan) if plan.has_enough_context => NodeId::Reporter,
    _ => NodeId::ResearchTeam,
  }
}

/// Route after the research-team dispatcher: pick the worker for the
/// first pending step, or close out the plan.
///
/// No usable plan sends control back to the planner; a fully executed
/// plan goes to the reporter. The worker choice biases toward the
/// researcher: only declared processing steps with complex-processing
/// keywords reach the coder.
pub fn from_research_team(state: &WorkflowState) -> NodeId {
  let Some(plan) = state.current_plan.as_ref().and_then(|draft| draft.as_plan()) else {
    debug!("no plan available, routing to planner");
    return NodeId::Planner;
  };
  if plan.steps.is_empty() {
    debug!("plan has no steps, routing to planner");
    return NodeId::Planner;
  }

  let Some(step) = plan.first_pending_step() else {
    debug!("all steps executed, routing to reporter");
    return NodeId::Reporter;
  };

  let category = classify(&step.title, &step.description, Some(step.step_type));
  let worker = match category {
    TaskCategory::ComplexProcessing => NodeId::Coder,
    TaskCategory::Summary
    | TaskCategory::SimpleArithmetic
    | TaskCategory::Research
    | TaskCategory::ProcessingDefault
    | TaskCategory::Unknown => NodeId::Researcher,
  };
  debug!(step = %step.title, category = ?category, worker = %worker, "dispatching step");
  worker
}

#[cfg(test)]
mod tests {
  use super::*;
  use larkspur_plan::{Plan, PlanDraft, Step, StepType};

  fn step(title: &str, step_type: StepType, done: bool) -> Step {
    Step {
      need_search: true,
      title: title.to_string(),
      description: String::new(),
      step_type,
      execution_res: done.then(|| "done".to_string()),
    }
  }

  fn state_with_plan(steps: Vec<Step>) -> WorkflowState {
    let mut state = WorkflowState::default();
    state.current_plan = Some(PlanDraft::Plan(Plan {
      locale: "en-US".to_string(),
      has_enough_context: false,
      thought: String::new(),
      title: "T".to_string(),
      steps,
    }));
    state
  }

  #[test]
  fn coordinator_routes_end_on_empty_topic() {
    let state = WorkflowState::default();
    assert_eq!(from_coordinator(&state), NodeId::End);
  }

  #[test]
  fn coordinator_routes_investigator_when_enabled() {
    let mut state = WorkflowState::default();
    state.research_topic = "ev adoption".to_string();
    state.enable_background_investigation = true;
    assert_eq!(from_coordinator(&state), NodeId::BackgroundInvestigator);

    state.enable_background_investigation = false;
    assert_eq!(from_coordinator(&state), NodeId::Planner);
  }

  #[test]
  fn planner_routes_raw_drafts_to_feedback() {
    let mut state = WorkflowState::default();
    state.current_plan = Some(PlanDraft::Raw("{not yet".to_string()));
    assert_eq!(from_planner(&state), NodeId::HumanFeedback);
  }

  #[test]
  fn planner_routes_sufficient_plans_to_reporter() {
    let mut state = state_with_plan(vec![]);
    if let Some(PlanDraft::Plan(plan)) = state.current_plan.as_mut() {
      plan.has_enough_context = true;
    }
    assert_eq!(from_planner(&state), NodeId::Reporter);
  }

  #[test]
  fn feedback_routes_to_research_team_by_default() {
    let state = state_with_plan(vec![step("a", StepType::Research, false)]);
    assert_eq!(from_human_feedback(&state), NodeId::ResearchTeam);
  }

  #[test]
  fn research_team_routes_to_planner_without_plan() {
    let state = WorkflowState::default();
    assert_eq!(from_research_team(&state), NodeId::Planner);

    let empty = state_with_plan(vec![]);
    assert_eq!(from_research_team(&empty), NodeId::Planner);

    let mut raw = WorkflowState::default();
    raw.current_plan = Some(PlanDraft::Raw("draft".to_string()));
    assert_eq!(from_research_team(&raw), NodeId::Planner);
  }

  #[test]
  fn summary_step_goes_to_researcher_even_when_processing() {
    let state = state_with_plan(vec![step("总结研究发现", StepType::Processing, false)]);
    assert_eq!(from_research_team(&state), NodeId::Researcher);
  }

  #[test]
  fn complex_coding_step_goes_to_coder() {
    let state = state_with_plan(vec![step("编写算法并绘图", StepType::Processing, false)]);
    assert_eq!(from_research_team(&state), NodeId::Coder);
  }

  #[test]
  fn plain_processing_step_goes_to_researcher() {
    let state = state_with_plan(vec![step("tabulate findings neatly", StepType::Processing, false)]);
    assert_eq!(from_research_team(&state), NodeId::Researcher);
  }

  #[test]
  fn dispatch_skips_completed_steps() {
    let state = state_with_plan(vec![
      step("research prior art", StepType::Research, true),
      step("编写算法并绘图", StepType::Processing, false),
    ]);
    assert_eq!(from_research_team(&state), NodeId::Coder);
  }

  #[test]
  fn all_steps_done_routes_to_reporter() {
    let state = state_with_plan(vec![
      step("a", StepType::Research, true),
      step("b", StepType::Processing, true),
    ]);
    assert_eq!(from_research_team(&state), NodeId::Reporter);
  }

  #[test]
  fn routers_are_idempotent_on_immutable_state() {
    let state = state_with_plan(vec![step("总结", StepType::Processing, false)]);
    let before = state.clone();

    assert_eq!(from_research_team(&state), from_research_team(&state));
    assert_eq!(from_planner(&state), from_planner(&state));
    assert_eq!(from_coordinator(&state), from_coordinator(&state));
    assert_eq!(from_human_feedback(&state), from_human_feedback(&state));
    assert_eq!(state, before);
  }
}
